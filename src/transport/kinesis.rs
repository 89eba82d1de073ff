//! Kinesis delivery: one PutRecords batch for the whole run.

use crate::recipe::{AwsCredentials, IngestFormat, IngestSource};
use anyhow::{Context, Result};
use aws_sdk_kinesis::primitives::Blob;
use aws_sdk_kinesis::types::PutRecordsRequestEntry;
use clap::Args;

/// Fixed partition key; the tests don't care about shard placement.
const PARTITION_KEY: &str = "test_name";

#[derive(Args, Clone, Debug)]
pub struct KinesisOpts {
    /// Kinesis stream name
    #[arg(long, short = 'n')]
    pub stream_name: String,

    #[command(flatten)]
    pub credentials: AwsCredentials,
}

impl KinesisOpts {
    pub fn recipe_source(&self, run_name: &str) -> IngestSource {
        IngestSource::Kinesis {
            name: run_name.to_string(),
            format: IngestFormat::cypher_json(),
            stream_name: self.stream_name.clone(),
            credentials: self.credentials.clone(),
        }
    }

    pub async fn deliver(&self, payloads: &[Vec<u8>]) -> Result<()> {
        let config = super::aws_sdk_config(&self.credentials).await;
        let client = aws_sdk_kinesis::Client::new(&config);

        let entries = payloads
            .iter()
            .map(|payload| {
                PutRecordsRequestEntry::builder()
                    .data(Blob::new(payload.clone()))
                    .partition_key(PARTITION_KEY)
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to build Kinesis record entries")?;

        let output = client
            .put_records()
            .stream_name(&self.stream_name)
            .set_records(Some(entries))
            .send()
            .await
            .with_context(|| {
                format!("Failed to put records to stream '{}'", self.stream_name)
            })?;

        let failed = output.failed_record_count().unwrap_or(0);
        if failed > 0 {
            anyhow::bail!(
                "Kinesis rejected {failed} of {} records for stream '{}'",
                payloads.len(),
                self.stream_name
            );
        }

        tracing::info!(
            "Published {} records to Kinesis stream '{}'",
            payloads.len(),
            self.stream_name
        );
        Ok(())
    }
}
