//! Reversible record encodings.
//!
//! Records are wrapped in an ordered chain of transforms before being
//! published, and the same chain is declared to the ingest API as its
//! `recordDecoders` list. The target system unwraps payloads by applying the
//! decoders in declared order, so encoding applies the transforms in reverse
//! declared order: the first-declared transform ends up outermost.
//!
//! Compressed output is not valid UTF-8, so encoded payloads are carried as
//! raw bytes end to end. Transports that can only carry text convert at the
//! edge and fail loudly when the outermost transform is not text-safe.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use serde::Serialize;
use std::io::{Read, Write};
use thiserror::Error;

/// Errors from applying or reversing a record encoding.
#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("compression error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("decoded payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// A reversible byte-level transform.
///
/// The set is closed; serialized names match what the ingest API accepts in
/// `recordDecoders`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Transform {
    Gzip,
    Zlib,
    Base64,
}

impl Transform {
    /// Parse a comma-separated list of transform names.
    ///
    /// Whitespace around entries is trimmed; empty and unrecognized entries
    /// are dropped (with a warning) rather than treated as errors. Input
    /// order is preserved.
    pub fn parse_csv(csv: &str) -> Vec<Transform> {
        csv.split(',')
            .filter_map(|entry| match entry.trim() {
                "Gzip" => Some(Transform::Gzip),
                "Zlib" => Some(Transform::Zlib),
                "Base64" => Some(Transform::Base64),
                "" => None,
                other => {
                    tracing::warn!("Ignoring unrecognized encoding '{other}'");
                    None
                }
            })
            .collect()
    }

    /// Apply this transform to a byte sequence.
    pub fn apply(&self, bytes: &[u8]) -> Result<Vec<u8>, EncodingError> {
        match self {
            Transform::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(bytes)?;
                Ok(encoder.finish()?)
            }
            Transform::Zlib => {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(bytes)?;
                Ok(encoder.finish()?)
            }
            Transform::Base64 => Ok(BASE64.encode(bytes).into_bytes()),
        }
    }

    /// Reverse this transform. Fails if the bytes are not validly encoded.
    pub fn reverse(&self, bytes: &[u8]) -> Result<Vec<u8>, EncodingError> {
        match self {
            Transform::Gzip => {
                let mut decoder = GzDecoder::new(bytes);
                let mut out = Vec::new();
                decoder.read_to_end(&mut out)?;
                Ok(out)
            }
            Transform::Zlib => {
                let mut decoder = ZlibDecoder::new(bytes);
                let mut out = Vec::new();
                decoder.read_to_end(&mut out)?;
                Ok(out)
            }
            Transform::Base64 => Ok(BASE64.decode(bytes)?),
        }
    }
}

impl std::fmt::Display for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transform::Gzip => write!(f, "Gzip"),
            Transform::Zlib => write!(f, "Zlib"),
            Transform::Base64 => write!(f, "Base64"),
        }
    }
}

/// Encode plaintext through the transform chain.
///
/// Transforms are applied in reverse declared order so that the
/// first-declared transform is the outermost layer, matching the order the
/// target system applies its decoders.
pub fn encode(transforms: &[Transform], plaintext: &str) -> Result<Vec<u8>, EncodingError> {
    let mut bytes = plaintext.as_bytes().to_vec();
    for transform in transforms.iter().rev() {
        bytes = transform.apply(&bytes)?;
    }
    Ok(bytes)
}

/// Decode a payload by reversing the transforms in declared order.
pub fn decode(transforms: &[Transform], payload: &[u8]) -> Result<String, EncodingError> {
    let mut bytes = payload.to_vec();
    for transform in transforms {
        bytes = transform.reverse(&bytes)?;
    }
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{"test_name":"AbCdEfGhIj","counter":3}"#;

    #[test]
    fn test_roundtrip_all_transform_lists() {
        let lists: Vec<Vec<Transform>> = vec![
            vec![],
            vec![Transform::Gzip],
            vec![Transform::Zlib],
            vec![Transform::Base64],
            vec![Transform::Base64, Transform::Gzip],
            vec![Transform::Base64, Transform::Zlib],
            vec![Transform::Gzip, Transform::Base64],
            vec![Transform::Base64, Transform::Zlib, Transform::Gzip],
        ];

        for transforms in lists {
            let encoded = encode(&transforms, SAMPLE).unwrap();
            let decoded = decode(&transforms, &encoded).unwrap();
            assert_eq!(decoded, SAMPLE, "roundtrip failed for {transforms:?}");
        }
    }

    #[test]
    fn test_empty_list_is_identity() {
        let encoded = encode(&[], SAMPLE).unwrap();
        assert_eq!(encoded, SAMPLE.as_bytes());
    }

    #[test]
    fn test_order_is_load_bearing() {
        let encoded = encode(&[Transform::Base64, Transform::Gzip], SAMPLE).unwrap();

        // Decoding with the reversed list tries to gunzip base64 text.
        let wrong_order = decode(&[Transform::Gzip, Transform::Base64], &encoded);
        match wrong_order {
            Err(_) => {}
            Ok(decoded) => assert_ne!(decoded, SAMPLE),
        }
    }

    #[test]
    fn test_first_declared_transform_is_outermost() {
        // Base64 declared first means the wire payload is base64 text whose
        // decoded form is a gzip stream.
        let encoded = encode(&[Transform::Base64, Transform::Gzip], SAMPLE).unwrap();
        assert!(encoded.is_ascii());

        let inner = Transform::Base64.reverse(&encoded).unwrap();
        assert_eq!(&inner[..2], &[0x1f, 0x8b], "expected gzip magic bytes");
    }

    #[test]
    fn test_parse_csv_drops_unknown_names() {
        let transforms = Transform::parse_csv("Gzip, Bogus, Base64");
        assert_eq!(transforms, vec![Transform::Gzip, Transform::Base64]);
    }

    #[test]
    fn test_parse_csv_empty_input() {
        assert!(Transform::parse_csv("").is_empty());
        assert!(Transform::parse_csv(" , ,").is_empty());
    }

    #[test]
    fn test_parse_csv_preserves_order() {
        let transforms = Transform::parse_csv("Base64,Zlib,Gzip");
        assert_eq!(
            transforms,
            vec![Transform::Base64, Transform::Zlib, Transform::Gzip]
        );
    }

    #[test]
    fn test_reverse_rejects_corrupt_stream() {
        let result = Transform::Gzip.reverse(b"not a gzip stream");
        assert!(result.is_err());
    }

    #[test]
    fn test_transform_serializes_to_decoder_name() {
        let json = serde_json::to_string(&vec![Transform::Gzip, Transform::Base64]).unwrap();
        assert_eq!(json, r#"["Gzip","Base64"]"#);
    }
}
