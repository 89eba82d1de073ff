//! Pulsar delivery: per-record sends awaiting the broker receipt.

use crate::recipe::{IngestFormat, IngestSource, SubscriptionType};
use anyhow::{Context, Result};
use clap::Args;
use pulsar::{Pulsar, TokioExecutor};

#[derive(Args, Clone, Debug)]
pub struct PulsarOpts {
    /// Pulsar topic to publish to and ingest from
    #[arg(long, short = 't', default_value = "test_topic")]
    pub topic: String,

    /// Pulsar service URL
    #[arg(long = "pulsar-url", short = 'u', default_value = "pulsar://localhost:6650")]
    pub pulsar_url: String,

    /// Subscription name declared in the recipe
    #[arg(long, short = 'n', default_value = "my_subscription")]
    pub subscription_name: String,

    /// Subscription type declared in the recipe
    #[arg(long, value_enum, default_value = "shared")]
    pub subscription_type: SubscriptionType,
}

impl PulsarOpts {
    pub fn recipe_source(&self, run_name: &str) -> IngestSource {
        IngestSource::Pulsar {
            name: run_name.to_string(),
            format: IngestFormat::cypher_json(),
            topics: vec![self.topic.clone()],
            pulsar_url: self.pulsar_url.clone(),
            subscription_name: self.subscription_name.clone(),
            subscription_type: self.subscription_type,
        }
    }

    pub async fn deliver(&self, payloads: &[Vec<u8>]) -> Result<()> {
        let client: Pulsar<TokioExecutor> =
            Pulsar::builder(self.pulsar_url.clone(), TokioExecutor)
                .build()
                .await
                .with_context(|| format!("Failed to connect to Pulsar at {}", self.pulsar_url))?;

        let mut producer = client
            .producer()
            .with_topic(self.topic.clone())
            .build()
            .await
            .with_context(|| format!("Failed to create producer for topic '{}'", self.topic))?;

        for payload in payloads {
            tracing::debug!("Writing {} bytes to topic '{}'", payload.len(), self.topic);

            producer
                .send_non_blocking(payload.clone())
                .await
                .with_context(|| format!("Failed to send record to topic '{}'", self.topic))?
                .await
                .context("Pulsar broker did not acknowledge the message")?;
        }

        producer
            .close()
            .await
            .context("Failed to close Pulsar producer")?;

        tracing::info!(
            "Published {} records to Pulsar topic '{}'",
            payloads.len(),
            self.topic
        );
        Ok(())
    }
}
