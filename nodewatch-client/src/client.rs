//! Client for the system health API.
//!
//! The API exposes three read-only endpoints under a common base URL:
//!
//! | endpoint | path |
//! |---|---|
//! | cluster overview | `{base}/cluster` |
//! | node details | `{base}/cluster/{node_id}` |
//! | cluster insights | `{base}/cluster_insights` |
//!
//! Every call is a single unauthenticated GET carrying `start_date` and
//! `end_date` query parameters. There is no retry; a failed call is
//! reported to the caller, who decides what to keep on screen.
//!
//! ## Example
//!
//! ```rust,no_run
//! use nodewatch_client::MonitoringClient;
//! use nodewatch_types::TimeRange;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MonitoringClient::builder()
//!         .endpoint("http://localhost:8080/api/fobr/system_health")
//!         .build()?;
//!
//!     let range = TimeRange::new("2024-01-02 09:00:00", "2024-01-02 10:00:00");
//!     let overview = client.cluster_overview(&range).await?;
//!
//!     for node in &overview.data {
//!         println!("{}: {}", node.node_name, node.health_status);
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use nodewatch_types::{
    ApiEnvelope, ClusterInsights, ClusterOverview, NodeDetails, TimeRange,
};

use crate::ClientError;

/// Default base URL of the health API.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/api/fobr/system_health";

/// Client for the three health API endpoints.
#[derive(Debug, Clone)]
pub struct MonitoringClient {
    client: Client,
    endpoint: String,
}

impl MonitoringClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> MonitoringClientBuilder {
        MonitoringClientBuilder::default()
    }

    /// Base URL every request is built from.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the per-node health records of the whole cluster.
    pub async fn cluster_overview(&self, range: &TimeRange) -> Result<ClusterOverview, ClientError> {
        let url = self.overview_url();
        self.get(&url, range).await
    }

    /// Fetch totals and time series for a single node.
    pub async fn node_details(
        &self,
        node_id: &str,
        range: &TimeRange,
    ) -> Result<NodeDetails, ClientError> {
        let url = self.node_url(node_id);
        self.get(&url, range).await
    }

    /// Fetch the comparative multi-node table and stats card.
    pub async fn cluster_insights(&self, range: &TimeRange) -> Result<ClusterInsights, ClientError> {
        let url = self.insights_url();
        self.get(&url, range).await
    }

    fn overview_url(&self) -> String {
        format!("{}/cluster", self.endpoint)
    }

    fn node_url(&self, node_id: &str) -> String {
        format!("{}/cluster/{}", self.endpoint, urlencoded(node_id))
    }

    fn insights_url(&self) -> String {
        format!("{}/cluster_insights", self.endpoint)
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, range: &TimeRange) -> Result<T, ClientError> {
        debug!(url, start = %range.start, end = %range.end, "GET");

        let response = self.client.get(url).query(&range.query()).send().await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await?;
        let envelope: ApiEnvelope<T> = serde_json::from_slice(&body)?;
        Ok(envelope.result)
    }
}

/// Builder for MonitoringClient.
#[derive(Debug, Default)]
pub struct MonitoringClientBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl MonitoringClientBuilder {
    /// Set the API base URL (e.g., "http://localhost:8080/api/fobr/system_health").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the request timeout (default: 30 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<MonitoringClient, ClientError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(30));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(MonitoringClient { client, endpoint })
    }
}

// Percent-encode the characters that would break a path segment
fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            ' ' => out.push_str("%20"),
            '?' => out.push_str("%3F"),
            '#' => out.push_str("%23"),
            _ => out.push(c),
        }
    }
    out
}
