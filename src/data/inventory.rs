//! Node and application inventory.
//!
//! The inventory is a JSON document listing the fleet's nodes and the
//! applications they host, with the metrics the dashboard cards show:
//!
//! ```json
//! {
//!   "nodes": [{ "id": "node-01", "name": "appnode01", "cpuPercent": 68, ... }],
//!   "applications": [{ "id": "app-om-gateway", "name": "OM Gateway", ... }]
//! }
//! ```
//!
//! A `status` field in the file is ignored. Statuses are always derived from
//! the metrics with the configured [`Thresholds`].

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::classify::{HealthStatus, MetricKind, Thresholds};
use super::status::{application_status, node_status, Classified};
use super::trend::{detect_trend, Trend};

/// Metrics of one application-server node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeMetric {
    pub id: String,
    pub name: String,
    pub cpu_percent: f64,
    pub jvm_memory_percent: f64,
    pub active_transactions: u64,
    pub transaction_trend: Vec<f64>,
    pub db_response_time: f64,
    pub db_response_trend: Vec<f64>,
    pub amb_rate: f64,
    pub amb_trend: Trend,
    pub thread_queue_depth: u64,
    pub slow_pattern_count: u64,
    /// Ids of the applications hosted on this node.
    pub applications: Vec<String>,
    #[serde(skip_deserializing)]
    pub status: HealthStatus,
}

impl NodeMetric {
    /// Short alert label for the node card, most severe first.
    pub fn alert_label(&self, thresholds: &Thresholds) -> Option<&'static str> {
        if self.status == HealthStatus::Critical {
            Some("Critical")
        } else if thresholds.is_flagged(MetricKind::QueueDepth, self.thread_queue_depth as f64) {
            Some("High queue")
        } else if thresholds.is_flagged(MetricKind::SlowPatterns, self.slow_pattern_count as f64)
        {
            Some("Slow patterns")
        } else {
            None
        }
    }

    /// Direction of the active-transaction series.
    pub fn transaction_direction(&self) -> Trend {
        detect_trend(&self.transaction_trend)
    }

    /// Direction of the DB response series.
    pub fn db_response_direction(&self) -> Trend {
        detect_trend(&self.db_response_trend)
    }
}

impl Classified for NodeMetric {
    fn status(&self) -> HealthStatus {
        self.status
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

/// Metrics of one hosted application.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationMetric {
    pub id: String,
    pub name: String,
    pub total_hits: u64,
    pub hits_trend: Vec<f64>,
    pub avg_response_time: f64,
    pub db_time_percent: f64,
    pub script_time_percent: f64,
    pub top_slow_urls: Vec<String>,
    pub error_rate: f64,
    pub most_expensive_transaction: String,
    /// Ids of the nodes hosting this application.
    pub nodes: Vec<String>,
    #[serde(skip_deserializing)]
    pub status: HealthStatus,
}

impl ApplicationMetric {
    /// Share of time spent outside DB and script execution.
    pub fn other_time_percent(&self) -> f64 {
        (100.0 - self.db_time_percent - self.script_time_percent).max(0.0)
    }

    /// Direction of the hits series.
    pub fn hits_direction(&self) -> Trend {
        detect_trend(&self.hits_trend)
    }

    // DB and script shares must not exceed 100% together
    fn normalize_time_split(&mut self) {
        let db = self.db_time_percent.clamp(0.0, 100.0);
        let script = self.script_time_percent.clamp(0.0, 100.0 - db);
        if db != self.db_time_percent || script != self.script_time_percent {
            warn!(
                app = %self.id,
                db = self.db_time_percent,
                script = self.script_time_percent,
                "Time split exceeds 100%, clamping script share"
            );
        }
        self.db_time_percent = db;
        self.script_time_percent = script;
    }
}

impl Classified for ApplicationMetric {
    fn status(&self) -> HealthStatus {
        self.status
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

/// The fleet's nodes and applications.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Inventory {
    pub nodes: Vec<NodeMetric>,
    pub applications: Vec<ApplicationMetric>,
}

impl Inventory {
    /// Load and classify an inventory file.
    pub fn load(path: &Path, thresholds: &Thresholds) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading inventory {}", path.display()))?;
        Self::parse(&content, thresholds)
    }

    /// Parse and classify an inventory document.
    pub fn parse(content: &str, thresholds: &Thresholds) -> Result<Self> {
        let mut inventory: Inventory =
            serde_json::from_str(content).context("parsing inventory")?;
        for app in &mut inventory.applications {
            app.normalize_time_split();
        }
        inventory.reclassify(thresholds);
        Ok(inventory)
    }

    /// Re-derive every status from the metrics.
    pub fn reclassify(&mut self, thresholds: &Thresholds) {
        for node in &mut self.nodes {
            node.status = node_status(thresholds, node.cpu_percent, node.jvm_memory_percent);
        }
        for app in &mut self.applications {
            app.status = application_status(thresholds, app.avg_response_time, app.error_rate);
        }
    }

    pub fn node(&self, id: &str) -> Option<&NodeMetric> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn application(&self, id: &str) -> Option<&ApplicationMetric> {
        self.applications.iter().find(|a| a.id == id)
    }

    /// Applications hosted on the given node.
    pub fn applications_on(&self, node_id: &str) -> Vec<&ApplicationMetric> {
        self.applications.iter().filter(|a| a.nodes.iter().any(|n| n == node_id)).collect()
    }

    /// Applications a node lists as hosted; unknown ids are skipped.
    pub fn hosted_by(&self, node: &NodeMetric) -> Vec<&ApplicationMetric> {
        node.applications.iter().filter_map(|id| self.application(id)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.applications.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    pub(crate) fn sample_json() -> &'static str {
        r#"{
            "nodes": [
                {
                    "id": "node-01", "name": "appnode01",
                    "cpuPercent": 68, "jvmMemoryPercent": 72,
                    "activeTransactions": 145,
                    "transactionTrend": [120, 135, 128, 142, 138, 145, 140, 135, 145],
                    "dbResponseTime": 125, "dbResponseTrend": [110, 115, 120, 125],
                    "ambRate": 2450, "ambTrend": "up",
                    "threadQueueDepth": 12, "slowPatternCount": 8,
                    "status": "healthy",
                    "applications": ["app-om-gateway", "app-order-validation"]
                },
                {
                    "id": "node-02", "name": "appnode02",
                    "cpuPercent": 45, "jvmMemoryPercent": 58,
                    "activeTransactions": 98, "ambRate": 1890,
                    "threadQueueDepth": 18, "slowPatternCount": 3,
                    "applications": ["app-om-gateway"]
                },
                {
                    "id": "node-03", "name": "appnode03",
                    "cpuPercent": 88, "jvmMemoryPercent": 81,
                    "activeTransactions": 210, "ambRate": 3100,
                    "threadQueueDepth": 22, "slowPatternCount": 15,
                    "applications": ["app-om-gateway"]
                }
            ],
            "applications": [
                {
                    "id": "app-om-gateway", "name": "OM Gateway",
                    "totalHits": 62500, "hitsTrend": [58000, 59200, 60100, 61000, 61800, 62500],
                    "avgResponseTime": 142, "dbTimePercent": 45, "scriptTimePercent": 38,
                    "topSlowUrls": ["/api/gateway/auth", "/api/gateway/validate"],
                    "errorRate": 0.4, "mostExpensiveTransaction": "GatewayAuthentication",
                    "nodes": ["node-01", "node-02", "node-03"]
                },
                {
                    "id": "app-order-validation", "name": "Order Validation",
                    "totalHits": 48920, "avgResponseTime": 335,
                    "dbTimePercent": 62, "scriptTimePercent": 28,
                    "errorRate": 2.4,
                    "nodes": ["node-01"]
                }
            ]
        }"#
    }

    pub(crate) fn sample() -> Inventory {
        Inventory::parse(sample_json(), &Thresholds::default()).unwrap()
    }

    #[test]
    fn test_parse_derives_statuses() {
        let inv = sample();
        assert_eq!(inv.nodes.len(), 3);
        // CPU 68 / memory 72 sit just under both warning lines
        assert_eq!(inv.node("node-01").unwrap().status, HealthStatus::Healthy);
        assert_eq!(inv.node("node-03").unwrap().status, HealthStatus::Critical);
        assert_eq!(inv.application("app-om-gateway").unwrap().status, HealthStatus::Healthy);
        assert_eq!(
            inv.application("app-order-validation").unwrap().status,
            HealthStatus::Critical
        );
    }

    #[test]
    fn test_file_status_is_ignored() {
        let json = r#"{"nodes": [{"id": "n", "name": "n", "cpuPercent": 95, "status": "healthy"}]}"#;
        let inv = Inventory::parse(json, &Thresholds::default()).unwrap();
        assert_eq!(inv.nodes[0].status, HealthStatus::Critical);
    }

    #[test]
    fn test_reclassify_with_new_thresholds() {
        let mut inv = sample();
        let strict = Thresholds {
            cpu_warning: 40.0,
            ..Default::default()
        };
        inv.reclassify(&strict);
        assert_eq!(inv.node("node-02").unwrap().status, HealthStatus::Warning);
    }

    #[test]
    fn test_lookups() {
        let inv = sample();
        assert!(inv.node("missing").is_none());
        let on_node1: Vec<&str> =
            inv.applications_on("node-01").iter().map(|a| a.id.as_str()).collect();
        assert_eq!(on_node1, vec!["app-om-gateway", "app-order-validation"]);
        assert_eq!(inv.applications_on("node-02").len(), 1);
        assert!(inv.applications_on("node-99").is_empty());

        let hosted: Vec<&str> = inv
            .hosted_by(inv.node("node-01").unwrap())
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(hosted, on_node1);
    }

    #[test]
    fn test_alert_labels() {
        let inv = sample();
        let t = Thresholds::default();
        assert_eq!(inv.node("node-01").unwrap().alert_label(&t), None);
        assert_eq!(inv.node("node-02").unwrap().alert_label(&t), Some("High queue"));
        assert_eq!(inv.node("node-03").unwrap().alert_label(&t), Some("Critical"));

        let slow = NodeMetric {
            slow_pattern_count: 11,
            ..Default::default()
        };
        assert_eq!(slow.alert_label(&t), Some("Slow patterns"));
    }

    #[test]
    fn test_trend_directions() {
        let inv = sample();
        let node = inv.node("node-01").unwrap();
        assert_eq!(node.transaction_direction(), Trend::Up);
        assert_eq!(node.amb_trend, Trend::Up);
        assert_eq!(inv.node("node-02").unwrap().amb_trend, Trend::Stable);
        assert_eq!(inv.application("app-om-gateway").unwrap().hits_direction(), Trend::Up);
    }

    #[test]
    fn test_time_split_is_normalized() {
        let json = r#"{"applications": [{"id": "a", "dbTimePercent": 70, "scriptTimePercent": 45}]}"#;
        let inv = Inventory::parse(json, &Thresholds::default()).unwrap();
        let app = &inv.applications[0];
        assert_eq!(app.db_time_percent, 70.0);
        assert_eq!(app.script_time_percent, 30.0);
        assert_eq!(app.other_time_percent(), 0.0);

        let gateway = sample();
        let gateway = gateway.application("app-om-gateway").unwrap();
        assert_eq!(gateway.other_time_percent(), 17.0);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();
        let inv = Inventory::load(file.path(), &Thresholds::default()).unwrap();
        assert_eq!(inv.applications.len(), 2);
    }

    #[test]
    fn test_load_errors() {
        assert!(Inventory::load(Path::new("/nonexistent/inventory.json"), &Thresholds::default())
            .is_err());
        assert!(Inventory::parse("not json", &Thresholds::default()).is_err());
    }

    #[test]
    fn test_demo_inventory() {
        let content = include_str!("../../demos/inventory.json");
        let inv = Inventory::parse(content, &Thresholds::default()).unwrap();
        assert_eq!(inv.nodes.len(), 6);
        assert_eq!(inv.applications.len(), 27);
        for app in &inv.applications {
            assert!(app.nodes.iter().all(|id| inv.node(id).is_some()), "{}", app.name);
        }
        // both sides of the hosting relation name the same pairs
        for node in &inv.nodes {
            assert_eq!(inv.hosted_by(node).len(), node.applications.len(), "{}", node.name);
            for app in inv.hosted_by(node) {
                assert!(app.nodes.contains(&node.id), "{} on {}", app.id, node.id);
            }
        }
    }
}
