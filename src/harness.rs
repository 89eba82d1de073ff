//! Test run orchestration.
//!
//! A `TestRun` owns everything one invocation needs: the random run name used
//! as the correlation key, the record count, the transform chain, the API
//! client, and the transport. The run sequence is strictly sequential:
//! register recipe, generate records, deliver, wait for ingestion, query,
//! verify.

use crate::api::{ApiClient, QueryNode};
use crate::encoding::{EncodingError, Transform};
use crate::record::{self, CORRELATION_FIELD};
use crate::recipe::Recipe;
use crate::transport::Transport;
use anyhow::{Context, Result};
use std::time::Duration;
use tokio::time::Instant;

/// How often the ingestion-status endpoint is polled while waiting.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Outcome of comparing queried nodes against the expected batch.
#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    /// Number of records the run published.
    pub expected: u64,
    /// Number of nodes the query returned.
    pub found: u64,
    /// Nodes with the right correlation name and a fresh in-range counter.
    pub matched: u64,
    /// Nodes with a foreign name, bad counter, or duplicate counter.
    pub mismatched: u64,
    /// Expected records with no matching node.
    pub missing: u64,
}

impl VerificationReport {
    pub fn is_success(&self) -> bool {
        self.missing == 0 && self.mismatched == 0
    }

    pub fn summary(&self) -> String {
        if self.is_success() {
            format!(
                "Verification PASSED: {}/{} records ingested and matched",
                self.matched, self.expected
            )
        } else {
            format!(
                "Verification FAILED: expected {}, found {} ({} matched, {} mismatched, {} missing)",
                self.expected, self.found, self.matched, self.mismatched, self.missing
            )
        }
    }
}

/// Compare queried nodes against a run's expected records.
///
/// A node matches when its correlation property equals the run name and its
/// counter is in `0..expected` and not already claimed by an earlier node.
pub fn verify(name: &str, expected: u64, nodes: &[QueryNode]) -> VerificationReport {
    let mut seen = vec![false; expected as usize];
    let mut matched = 0u64;
    let mut mismatched = 0u64;

    for node in nodes {
        let correlation = node
            .properties
            .get(CORRELATION_FIELD)
            .and_then(|v| v.as_str());
        let counter = node.properties.get("counter").and_then(|v| v.as_u64());

        let mut ok = false;
        if correlation == Some(name) {
            if let Some(c) = counter {
                if c < expected && !seen[c as usize] {
                    seen[c as usize] = true;
                    ok = true;
                }
            }
        }

        if ok {
            matched += 1;
        } else {
            tracing::warn!(
                "Unexpected node: test_name={correlation:?} counter={counter:?}"
            );
            mismatched += 1;
        }
    }

    VerificationReport {
        expected,
        found: nodes.len() as u64,
        matched,
        mismatched,
        missing: expected.saturating_sub(matched),
    }
}

/// One test run against one transport.
pub struct TestRun {
    name: String,
    count: u64,
    transforms: Vec<Transform>,
    client: ApiClient,
    transport: Transport,
}

impl TestRun {
    /// Create a run with a freshly generated name.
    pub fn new(
        api_url: &str,
        count: u64,
        transforms: Vec<Transform>,
        transport: Transport,
    ) -> Result<Self> {
        Ok(TestRun {
            name: record::random_run_name(),
            count,
            transforms,
            client: ApiClient::new(api_url)?,
            transport,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full recipe for this run: transport source plus decoder list.
    pub fn recipe(&self) -> Recipe {
        Recipe {
            source: self.transport.recipe_source(&self.name),
            record_decoders: self.transforms.clone(),
        }
    }

    /// Encoded record batch; deterministic given the run name and count.
    pub fn generate_records(&self) -> Result<Vec<Vec<u8>>, EncodingError> {
        record::generate_records(&self.name, self.count, &self.transforms)
    }

    fn node_query(&self) -> String {
        format!(
            "MATCH (n) WHERE n.{CORRELATION_FIELD} = '{}' RETURN n LIMIT {}",
            self.name, self.count
        )
    }

    /// Poll the ingestion counter until it reaches the target or the timeout
    /// elapses. A zero timeout skips the wait entirely.
    ///
    /// Poll failures are logged and treated as "not ingested yet"; the final
    /// verification reports the real outcome either way.
    async fn await_ingestion(&self, timeout: Duration) {
        if timeout.is_zero() {
            return;
        }

        let deadline = Instant::now() + timeout;
        loop {
            match self.client.ingested_count(&self.name).await {
                Ok(count) if count >= self.count => {
                    tracing::info!("Ingested {count}/{} records", self.count);
                    return;
                }
                Ok(count) => {
                    tracing::debug!("Ingested {count}/{} records so far", self.count);
                }
                Err(e) => {
                    tracing::debug!("Ingest status poll failed: {e:#}");
                }
            }

            if Instant::now() >= deadline {
                tracing::warn!(
                    "Timed out after {timeout:?} waiting for {} records to be ingested",
                    self.count
                );
                return;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Execute the full run and verify the result.
    pub async fn run(&self, ingest_timeout: Duration) -> Result<VerificationReport> {
        tracing::info!(
            "Starting {} ingest test run '{}' (count={}, encodings={:?})",
            self.transport.kind(),
            self.name,
            self.count,
            self.transforms
        );

        self.client.create_ingest(&self.name, &self.recipe()).await?;

        let records = self
            .generate_records()
            .context("Failed to generate records")?;
        self.transport.deliver(&records).await?;

        self.await_ingestion(ingest_timeout).await;

        let nodes = self.client.query_nodes(&self.node_query()).await?;
        if let Some(first) = nodes.first() {
            tracing::debug!("First returned node: {:?}", first.properties);
        }

        let report = verify(&self.name, self.count, &nodes);
        if report.is_success() {
            tracing::info!("{}", report.summary());
            Ok(report)
        } else {
            tracing::error!("{}", report.summary());
            Err(anyhow::anyhow!(report.summary()))
        }
    }
}
