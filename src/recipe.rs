//! Ingest recipe wire types.
//!
//! A recipe tells the target system where to consume records from and how to
//! unwrap them. These types serialize to the exact JSON the
//! `POST /api/v1/ingest/{name}` endpoint expects, so field names follow the
//! API's camelCase convention.

use crate::encoding::Transform;
use clap::{Args, ValueEnum};
use serde::Serialize;

/// Ingest format shared by every transport: create one node per JSON record.
#[derive(Debug, Clone, Serialize)]
pub struct IngestFormat {
    pub query: String,
    #[serde(rename = "type")]
    pub format_type: String,
}

impl IngestFormat {
    pub fn cypher_json() -> Self {
        IngestFormat {
            query: "CREATE ($that)".to_string(),
            format_type: "CypherJson".to_string(),
        }
    }
}

/// Static AWS credentials passed through to the recipe and the AWS clients.
///
/// Test-only scope; plain strings are fine here.
#[derive(Args, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsCredentials {
    /// AWS region
    #[arg(long, short = 'r', default_value = "us-east-1")]
    pub region: String,

    /// AWS access key id
    #[arg(long, short = 'k')]
    pub access_key_id: String,

    /// AWS secret access key
    #[arg(long, short = 's')]
    pub secret_access_key: String,
}

/// Kafka consumer offset commit mode declared in the recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
pub enum OffsetCommitMode {
    AutoCommit,
    ExplicitCommit,
}

/// Wrapper matching the API's `{"type": "<mode>"}` shape.
#[derive(Debug, Clone, Serialize)]
pub struct OffsetCommitting {
    #[serde(rename = "type")]
    pub mode: OffsetCommitMode,
}

/// Pulsar subscription type declared in the recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
pub enum SubscriptionType {
    Exclusive,
    Shared,
    Failover,
    KeyShared,
}

/// Transport-specific half of a recipe, tagged by ingest type.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum IngestSource {
    #[serde(rename = "KafkaIngest", rename_all = "camelCase")]
    Kafka {
        name: String,
        format: IngestFormat,
        topics: Vec<String>,
        offset_committing: OffsetCommitting,
        bootstrap_servers: String,
    },

    #[serde(rename = "KinesisIngest", rename_all = "camelCase")]
    Kinesis {
        name: String,
        format: IngestFormat,
        stream_name: String,
        credentials: AwsCredentials,
    },

    #[serde(rename = "SQSIngest", rename_all = "camelCase")]
    Sqs {
        name: String,
        format: IngestFormat,
        queue_url: String,
        credentials: AwsCredentials,
    },

    #[serde(rename = "PulsarIngest", rename_all = "camelCase")]
    Pulsar {
        name: String,
        format: IngestFormat,
        topics: Vec<String>,
        pulsar_url: String,
        subscription_name: String,
        subscription_type: SubscriptionType,
    },
}

impl IngestSource {
    /// Ingest type tag as it appears on the wire, for log lines.
    pub fn type_tag(&self) -> &'static str {
        match self {
            IngestSource::Kafka { .. } => "KafkaIngest",
            IngestSource::Kinesis { .. } => "KinesisIngest",
            IngestSource::Sqs { .. } => "SQSIngest",
            IngestSource::Pulsar { .. } => "PulsarIngest",
        }
    }
}

/// Complete recipe body: the transport source merged with the decoder list
/// the target system must apply to unwrap each payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(flatten)]
    pub source: IngestSource,
    pub record_decoders: Vec<Transform>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn credentials() -> AwsCredentials {
        AwsCredentials {
            region: "us-east-1".to_string(),
            access_key_id: "AKIATEST".to_string(),
            secret_access_key: "sekrit".to_string(),
        }
    }

    #[test]
    fn test_kafka_recipe_json() {
        let recipe = Recipe {
            source: IngestSource::Kafka {
                name: "RunAbc1234".to_string(),
                format: IngestFormat::cypher_json(),
                topics: vec!["ingest-topic".to_string()],
                offset_committing: OffsetCommitting {
                    mode: OffsetCommitMode::AutoCommit,
                },
                bootstrap_servers: "localhost:9092".to_string(),
            },
            record_decoders: vec![Transform::Base64, Transform::Gzip],
        };

        let value = serde_json::to_value(&recipe).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "KafkaIngest",
                "name": "RunAbc1234",
                "format": {"query": "CREATE ($that)", "type": "CypherJson"},
                "topics": ["ingest-topic"],
                "offsetCommitting": {"type": "AutoCommit"},
                "bootstrapServers": "localhost:9092",
                "recordDecoders": ["Base64", "Gzip"],
            })
        );
    }

    #[test]
    fn test_kinesis_recipe_json() {
        let recipe = Recipe {
            source: IngestSource::Kinesis {
                name: "RunAbc1234".to_string(),
                format: IngestFormat::cypher_json(),
                stream_name: "test-stream".to_string(),
                credentials: credentials(),
            },
            record_decoders: vec![Transform::Base64],
        };

        let value = serde_json::to_value(&recipe).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "KinesisIngest",
                "name": "RunAbc1234",
                "format": {"query": "CREATE ($that)", "type": "CypherJson"},
                "streamName": "test-stream",
                "credentials": {
                    "region": "us-east-1",
                    "accessKeyId": "AKIATEST",
                    "secretAccessKey": "sekrit",
                },
                "recordDecoders": ["Base64"],
            })
        );
    }

    #[test]
    fn test_sqs_recipe_json() {
        let recipe = Recipe {
            source: IngestSource::Sqs {
                name: "RunAbc1234".to_string(),
                format: IngestFormat::cypher_json(),
                queue_url: "https://sqs.us-east-1.amazonaws.com/123/test-queue".to_string(),
                credentials: credentials(),
            },
            record_decoders: vec![],
        };

        let value = serde_json::to_value(&recipe).unwrap();
        assert_eq!(value["type"], "SQSIngest");
        assert_eq!(
            value["queueUrl"],
            "https://sqs.us-east-1.amazonaws.com/123/test-queue"
        );
        assert_eq!(value["recordDecoders"], json!([]));
    }

    #[test]
    fn test_pulsar_recipe_json() {
        let recipe = Recipe {
            source: IngestSource::Pulsar {
                name: "RunAbc1234".to_string(),
                format: IngestFormat::cypher_json(),
                topics: vec!["test_topic".to_string()],
                pulsar_url: "pulsar://localhost:6650".to_string(),
                subscription_name: "my_subscription".to_string(),
                subscription_type: SubscriptionType::Shared,
            },
            record_decoders: vec![],
        };

        let value = serde_json::to_value(&recipe).unwrap();
        assert_eq!(value["type"], "PulsarIngest");
        assert_eq!(value["pulsarUrl"], "pulsar://localhost:6650");
        assert_eq!(value["subscriptionName"], "my_subscription");
        assert_eq!(value["subscriptionType"], "Shared");
    }

    #[test]
    fn test_decoder_order_is_preserved() {
        let recipe = Recipe {
            source: IngestSource::Kafka {
                name: "RunAbc1234".to_string(),
                format: IngestFormat::cypher_json(),
                topics: vec!["t".to_string()],
                offset_committing: OffsetCommitting {
                    mode: OffsetCommitMode::ExplicitCommit,
                },
                bootstrap_servers: "localhost:9092".to_string(),
            },
            record_decoders: vec![Transform::Base64, Transform::Zlib, Transform::Gzip],
        };

        let value = serde_json::to_value(&recipe).unwrap();
        assert_eq!(value["recordDecoders"], json!(["Base64", "Zlib", "Gzip"]));
        assert_eq!(value["offsetCommitting"]["type"], "ExplicitCommit");
    }
}
