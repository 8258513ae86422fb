//! Cluster insights payload.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::{coerce, DateStamp, Numeric};

/// One time bucket of the comparative insights table.
///
/// Keys are `<node_id>_<metric>` (for example `node-01_cpu`) plus a time
/// label under `time` or `datetime`.
pub type InsightRow = BTreeMap<String, Option<Numeric>>;

/// Status snapshot of one node inside the insights payload.
///
/// Unlike the cluster overview, `health_status` arrives lowercase here
/// (`normal`, `warning`, `critical`).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NodeState {
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub node_id: String,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub node_name: String,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub health_status: String,
}

/// Server-computed cluster statistics.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StatsCard {
    pub avg_cpu: Numeric,
    pub avg_memory: Numeric,
    pub avg_db_time_ms: Numeric,
    pub total_amb: Numeric,
    pub total_txns: Numeric,
    pub max_queue: Numeric,
}

/// `result` of the cluster insights endpoint.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClusterInsights {
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub data: Vec<InsightRow>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub node_statuses: Vec<NodeState>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub stats_card: StatsCard,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub start_date: DateStamp,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub end_date: DateStamp,
}

impl ClusterInsights {
    /// Read one cell of the wide table; absent or non-numeric cells are `0`.
    pub fn cell(&self, row: usize, key: &str) -> f64 {
        coerce(self.data.get(row).and_then(|r| r.get(key)).and_then(|v| v.as_ref()))
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;
    use crate::ApiEnvelope;

    #[test]
    fn deserialize_insights() {
        let json = r#"{
            "result": {
                "data": [
                    {"time": "09:00", "n1_cpu": 45, "n1_memory": "61.5", "n2_cpu": null},
                    {"time": "10:00", "n1_cpu": 52, "n1_memory": "63", "n2_cpu": 70}
                ],
                "node_statuses": [
                    {"node_id": "n1", "node_name": "appnode01", "health_status": "normal"},
                    {"node_id": "n2", "node_name": "appnode02", "health_status": "critical"}
                ],
                "stats_card": {
                    "avg_cpu": 48, "avg_memory": "62", "avg_db_time_ms": 110,
                    "total_amb": 4200, "total_txns": 380, "max_queue": 12
                },
                "start_date": "2024-01-02 09:00:00",
                "end_date": "2024-01-02 10:00:00"
            }
        }"#;

        let envelope: ApiEnvelope<ClusterInsights> = serde_json::from_str(json).unwrap();
        let insights = envelope.result;

        assert_eq!(insights.data.len(), 2);
        assert_eq!(insights.cell(0, "n1_memory"), 61.5);
        assert_eq!(insights.cell(0, "n2_cpu"), 0.0);
        assert_eq!(insights.cell(1, "n2_cpu"), 70.0);
        assert_eq!(insights.cell(5, "n2_cpu"), 0.0);
        assert_eq!(insights.node_statuses[1].health_status, "critical");
        assert_eq!(insights.stats_card.avg_memory.value(), 62.0);
        assert_eq!(insights.stats_card.max_queue.value(), 12.0);
        assert_eq!(insights.end_date.first(), Some("2024-01-02 10:00:00"));
    }

    #[test]
    fn null_stats_card_defaults() {
        let insights: ClusterInsights =
            serde_json::from_str(r#"{"stats_card": null, "data": null}"#).unwrap();
        assert_eq!(insights.stats_card.total_txns.value(), 0.0);
        assert!(insights.data.is_empty());
    }

    #[test]
    fn non_scalar_cells_read_as_zero() {
        let json = r#"{"result": {
            "data": [{"time": "09:00", "n1_cpu": {"avg": 40}, "n1_queue": [1, 2], "n1_db": "12"}],
            "node_statuses": [{"node_id": "n1", "node_name": null, "health_status": "normal"}]
        }}"#;
        let envelope: ApiEnvelope<ClusterInsights> = serde_json::from_str(json).unwrap();
        let insights = envelope.result;
        assert_eq!(insights.cell(0, "n1_cpu"), 0.0);
        assert_eq!(insights.cell(0, "n1_queue"), 0.0);
        assert_eq!(insights.cell(0, "n1_db"), 12.0);
        assert_eq!(insights.node_statuses[0].node_name, "");
    }
}
