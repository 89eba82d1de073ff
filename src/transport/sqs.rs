//! SQS delivery: one SendMessage call per record, sequential.

use crate::recipe::{AwsCredentials, IngestFormat, IngestSource};
use anyhow::{Context, Result};
use clap::Args;

#[derive(Args, Clone, Debug)]
pub struct SqsOpts {
    /// SQS queue URL
    #[arg(long, short = 'u')]
    pub queue_url: String,

    #[command(flatten)]
    pub credentials: AwsCredentials,
}

impl SqsOpts {
    pub fn recipe_source(&self, run_name: &str) -> IngestSource {
        IngestSource::Sqs {
            name: run_name.to_string(),
            format: IngestFormat::cypher_json(),
            queue_url: self.queue_url.clone(),
            credentials: self.credentials.clone(),
        }
    }

    pub async fn deliver(&self, payloads: &[Vec<u8>]) -> Result<()> {
        let config = super::aws_sdk_config(&self.credentials).await;
        let client = aws_sdk_sqs::Client::new(&config);

        for payload in payloads {
            // SQS message bodies are text. With a compression transform
            // outermost the payload is binary and cannot be queued.
            let body = String::from_utf8(payload.clone()).context(
                "SQS message bodies must be valid UTF-8; declare Base64 as the first \
                 (outermost) encoding when compressing",
            )?;

            let output = client
                .send_message()
                .queue_url(&self.queue_url)
                .message_body(body)
                .send()
                .await
                .with_context(|| {
                    format!("Failed to send message to queue '{}'", self.queue_url)
                })?;

            tracing::debug!(
                "Sent message {} to queue '{}'",
                output.message_id().unwrap_or("<unknown>"),
                self.queue_url
            );
        }

        tracing::info!(
            "Published {} records to SQS queue '{}'",
            payloads.len(),
            self.queue_url
        );
        Ok(())
    }
}
