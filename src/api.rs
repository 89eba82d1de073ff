//! HTTP client for the target system's ingest and query endpoints.

use crate::recipe::Recipe;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Status payload returned by `GET /api/v1/ingest/{name}`.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestStatus {
    pub stats: IngestStats,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestStats {
    pub ingested_count: u64,
}

/// One node returned by the cypher node query endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryNode {
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// Thin client over the target system's HTTP API.
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    /// Create a client for the given endpoint.
    ///
    /// Accepts either a bare `host:port` or a full `http(s)://` URL; bare
    /// endpoints are reached over plain HTTP.
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = endpoint.trim_end_matches('/');
        let base_url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("http://{endpoint}")
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(ApiClient { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Register an ingest recipe under the given name.
    ///
    /// A non-2xx response is logged but not treated as fatal; the final
    /// verification surfaces the root cause with more context than the
    /// status code alone.
    pub async fn create_ingest(&self, name: &str, recipe: &Recipe) -> Result<()> {
        let url = format!("{}/api/v1/ingest/{name}", self.base_url);
        tracing::info!(
            "Registering {} recipe at {url}",
            recipe.source.type_tag()
        );
        tracing::debug!(
            "Recipe body: {}",
            serde_json::to_string(recipe).unwrap_or_default()
        );

        let response = self
            .client
            .post(&url)
            .json(recipe)
            .send()
            .await
            .with_context(|| format!("Failed to reach ingest API at {url}"))?;

        self.log_response("POST", &url, response).await;
        Ok(())
    }

    /// Read the ingested-record counter for a named ingest source.
    pub async fn ingested_count(&self, name: &str) -> Result<u64> {
        let url = format!("{}/api/v1/ingest/{name}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to reach ingest API at {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("GET {url} returned {status}: {body}");
        }

        let ingest_status: IngestStatus = response
            .json()
            .await
            .with_context(|| format!("Failed to parse ingest status from {url}"))?;
        Ok(ingest_status.stats.ingested_count)
    }

    /// Run a cypher node query and return the matching nodes.
    ///
    /// The query endpoint takes the query string as a plain-text body.
    pub async fn query_nodes(&self, query: &str) -> Result<Vec<QueryNode>> {
        let url = format!("{}/api/v1/query/cypher/nodes", self.base_url);
        tracing::info!("Querying ingested nodes: {query}");

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(query.to_string())
            .send()
            .await
            .with_context(|| format!("Failed to reach query API at {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("POST {url} returned {status}: {body}");
        }

        let nodes: Vec<QueryNode> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse node list from {url}"))?;
        Ok(nodes)
    }

    async fn log_response(&self, method: &str, url: &str, response: reqwest::Response) {
        let status = response.status();
        if status.is_success() {
            tracing::info!("Success: {method} {url} {status}");
            if let Ok(body) = response.text().await {
                if !body.is_empty() {
                    tracing::debug!("Response body: {body}");
                }
            }
        } else {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Fail: {method} {url} {status}\n{body}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_endpoint_gets_http_scheme() {
        let client = ApiClient::new("localhost:8080").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_explicit_scheme_is_kept() {
        let client = ApiClient::new("https://ingest.example.com/").unwrap();
        assert_eq!(client.base_url(), "https://ingest.example.com");
    }

    #[test]
    fn test_parse_ingest_status() {
        let json = r#"{"name":"RunAbc1234","stats":{"ingestedCount":42,"rates":{}}}"#;
        let status: IngestStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.stats.ingested_count, 42);
    }

    #[test]
    fn test_parse_query_nodes() {
        let json = r#"[
            {"id":"1","properties":{"test_name":"RunAbc1234","counter":0}},
            {"id":"2","properties":{"test_name":"RunAbc1234","counter":1}}
        ]"#;
        let nodes: Vec<QueryNode> = serde_json::from_str(json).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].properties["test_name"], "RunAbc1234");
        assert_eq!(nodes[1].properties["counter"], 1);
    }

    #[test]
    fn test_query_node_without_properties() {
        let nodes: Vec<QueryNode> = serde_json::from_str(r#"[{"id":"3"}]"#).unwrap();
        assert!(nodes[0].properties.is_empty());
    }
}
