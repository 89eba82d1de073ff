//! Kafka delivery: one synchronous-from-the-caller send per record.

use crate::recipe::{IngestFormat, IngestSource, OffsetCommitMode, OffsetCommitting};
use anyhow::{Context, Result};
use clap::Args;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::ClientConfig;
use std::time::Duration;

#[derive(Args, Clone, Debug)]
pub struct KafkaOpts {
    /// Kafka bootstrap servers
    #[arg(long = "kafka-url", short = 'k', default_value = "localhost:9092")]
    pub kafka_url: String,

    /// Topic to publish to and ingest from
    #[arg(long, short = 't')]
    pub topic: String,

    /// Offset commit mode declared in the recipe
    #[arg(long, short = 'C', value_enum, default_value = "auto-commit")]
    pub commit: OffsetCommitMode,
}

impl KafkaOpts {
    pub fn recipe_source(&self, run_name: &str) -> IngestSource {
        IngestSource::Kafka {
            name: run_name.to_string(),
            format: IngestFormat::cypher_json(),
            topics: vec![self.topic.clone()],
            offset_committing: OffsetCommitting { mode: self.commit },
            bootstrap_servers: self.kafka_url.clone(),
        }
    }

    pub async fn deliver(&self, payloads: &[Vec<u8>]) -> Result<()> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &self.kafka_url)
            .set("message.timeout.ms", "5000")
            .create()
            .context("Failed to create Kafka producer")?;

        for payload in payloads {
            tracing::debug!("Writing {} bytes to topic '{}'", payload.len(), self.topic);

            // No message key; the ingest source does not partition by key.
            let record = FutureRecord::<(), _>::to(&self.topic).payload(payload);
            producer
                .send(record, Duration::from_secs(5))
                .await
                .map_err(|(err, _)| err)
                .with_context(|| format!("Failed to send record to topic '{}'", self.topic))?;
        }

        tracing::info!(
            "Published {} records to Kafka topic '{}'",
            payloads.len(),
            self.topic
        );
        Ok(())
    }
}
