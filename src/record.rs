//! Synthetic test records.
//!
//! Every run embeds its randomly generated name in each record so the final
//! query can filter the target system's nodes down to just this run's data.

use crate::encoding::{self, EncodingError, Transform};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Property name used to correlate ingested nodes with a test run.
pub const CORRELATION_FIELD: &str = "test_name";

/// Length of generated run names.
const RUN_NAME_LEN: usize = 10;

/// One synthetic record, serialized to JSON before encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRecord {
    pub test_name: String,
    pub counter: u64,
}

/// Generate a random run name used as the correlation key.
pub fn random_run_name() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(RUN_NAME_LEN)
        .map(char::from)
        .collect()
}

/// Generate `count` encoded records for a run.
///
/// Counters run from 0 to `count - 1` in order, so the batch is deterministic
/// given the run name and count. The batch is generated once per run and
/// shared by every transport.
pub fn generate_records(
    name: &str,
    count: u64,
    transforms: &[Transform],
) -> Result<Vec<Vec<u8>>, EncodingError> {
    let mut records = Vec::with_capacity(count as usize);
    for counter in 0..count {
        let record = TestRecord {
            test_name: name.to_string(),
            counter,
        };
        let json = serde_json::to_string(&record).expect("record serialization is infallible");
        records.push(encoding::encode(transforms, &json)?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_run_name_shape() {
        let name = random_run_name();
        assert_eq!(name.len(), RUN_NAME_LEN);
        assert!(name.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_random_run_names_differ() {
        assert_ne!(random_run_name(), random_run_name());
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = generate_records("RunAbc1234", 5, &[]).unwrap();
        let b = generate_records("RunAbc1234", 5, &[]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_counters_in_order() {
        let records = generate_records("RunAbc1234", 5, &[]).unwrap();
        assert_eq!(records.len(), 5);

        for (i, payload) in records.iter().enumerate() {
            let record: TestRecord = serde_json::from_slice(payload).unwrap();
            assert_eq!(record.test_name, "RunAbc1234");
            assert_eq!(record.counter, i as u64);
        }
    }

    #[test]
    fn test_encoded_records_decode_back_to_json() {
        let transforms = vec![Transform::Base64, Transform::Gzip];
        let records = generate_records("RunAbc1234", 3, &transforms).unwrap();

        for (i, payload) in records.iter().enumerate() {
            let json = encoding::decode(&transforms, payload).unwrap();
            let record: TestRecord = serde_json::from_str(&json).unwrap();
            assert_eq!(record.counter, i as u64);
        }
    }

    #[test]
    fn test_zero_count_yields_empty_batch() {
        let records = generate_records("RunAbc1234", 0, &[]).unwrap();
        assert!(records.is_empty());
    }
}
