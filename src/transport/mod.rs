//! Transport strategies for delivering encoded records.
//!
//! One variant per supported transport; the set is closed, so dispatch is an
//! enum rather than a trait object. Each variant knows how to describe itself
//! in an ingest recipe and how to publish a batch of encoded payloads.
//! Delivery is sequential and returns only once the underlying client has
//! confirmed the send; failures from the client libraries propagate as-is.

mod kafka;
mod kinesis;
mod pulsar;
mod sqs;

pub use kafka::KafkaOpts;
pub use kinesis::KinesisOpts;
pub use pulsar::PulsarOpts;
pub use sqs::SqsOpts;

use crate::recipe::{AwsCredentials, IngestSource};
use anyhow::Result;
use aws_config::{BehaviorVersion, Region};

/// A configured delivery target for one test run.
#[derive(Debug, Clone)]
pub enum Transport {
    Kafka(KafkaOpts),
    Kinesis(KinesisOpts),
    Sqs(SqsOpts),
    Pulsar(PulsarOpts),
}

impl Transport {
    /// Transport kind for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Transport::Kafka(_) => "kafka",
            Transport::Kinesis(_) => "kinesis",
            Transport::Sqs(_) => "sqs",
            Transport::Pulsar(_) => "pulsar",
        }
    }

    /// Build the transport-specific half of the ingest recipe.
    pub fn recipe_source(&self, run_name: &str) -> IngestSource {
        match self {
            Transport::Kafka(opts) => opts.recipe_source(run_name),
            Transport::Kinesis(opts) => opts.recipe_source(run_name),
            Transport::Sqs(opts) => opts.recipe_source(run_name),
            Transport::Pulsar(opts) => opts.recipe_source(run_name),
        }
    }

    /// Publish the batch of encoded payloads.
    pub async fn deliver(&self, payloads: &[Vec<u8>]) -> Result<()> {
        match self {
            Transport::Kafka(opts) => opts.deliver(payloads).await,
            Transport::Kinesis(opts) => opts.deliver(payloads).await,
            Transport::Sqs(opts) => opts.deliver(payloads).await,
            Transport::Pulsar(opts) => opts.deliver(payloads).await,
        }
    }
}

/// Build an AWS SDK config from the explicit credential triple.
///
/// The Kinesis and SQS clients share the same underlying credential type.
pub(crate) async fn aws_sdk_config(credentials: &AwsCredentials) -> aws_config::SdkConfig {
    let provider = aws_sdk_kinesis::config::Credentials::new(
        credentials.access_key_id.clone(),
        credentials.secret_access_key.clone(),
        None,
        None,
        "ingest-tester",
    );

    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(credentials.region.clone()))
        .credentials_provider(provider)
        .load()
        .await
}
