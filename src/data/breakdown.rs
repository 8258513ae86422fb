//! Per-node breakdown of an application.
//!
//! The inventory only carries application-wide aggregates, so the per-node
//! rows are an explicit proportional allocation: hits are split evenly over
//! the hosting nodes, response time and error rate carry over unchanged.
//! Row statuses are classified locally because the server never sees these
//! rows.

use serde::Serialize;

use super::classify::{HealthStatus, MetricKind, Thresholds};
use super::inventory::{ApplicationMetric, Inventory};
use super::status::{worst, Classified};

/// One (node, application) row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeAppDetail {
    pub node_id: String,
    pub node_name: String,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub response_time: f64,
    pub hits: u64,
    pub error_rate: f64,
    pub status: HealthStatus,
}

impl Classified for NodeAppDetail {
    fn status(&self) -> HealthStatus {
        self.status
    }

    fn display_name(&self) -> &str {
        &self.node_name
    }
}

/// Split `total` into `parts` integer shares that add back up to `total`.
///
/// The remainder goes one unit each to the first shares.
pub fn equal_split(total: u64, parts: usize) -> Vec<u64> {
    if parts == 0 {
        return Vec::new();
    }
    let parts_u = parts as u64;
    let base = total / parts_u;
    let remainder = (total % parts_u) as usize;
    (0..parts).map(|i| base + u64::from(i < remainder)).collect()
}

/// Breakdown rows for an application, one per hosting node in the
/// application's order.
///
/// Node ids missing from the inventory are skipped; the split is taken over
/// the nodes that resolve, so the rows' hits always sum to the total.
pub fn node_breakdown(
    inventory: &Inventory,
    app: &ApplicationMetric,
    thresholds: &Thresholds,
) -> Vec<NodeAppDetail> {
    let nodes: Vec<_> = app.nodes.iter().filter_map(|id| inventory.node(id)).collect();
    let shares = equal_split(app.total_hits, nodes.len());

    nodes
        .into_iter()
        .zip(shares)
        .map(|(node, hits)| {
            let status = worst([
                thresholds.classify(MetricKind::Cpu, node.cpu_percent),
                thresholds.classify(MetricKind::Memory, node.jvm_memory_percent),
                thresholds.classify(MetricKind::ResponseTime, app.avg_response_time),
                thresholds.classify(MetricKind::ErrorRate, app.error_rate),
            ]);
            NodeAppDetail {
                node_id: node.id.clone(),
                node_name: node.name.clone(),
                cpu_percent: node.cpu_percent,
                memory_percent: node.jvm_memory_percent,
                response_time: app.avg_response_time,
                hits,
                error_rate: app.error_rate,
                status,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::inventory::tests::sample;
    use proptest::prelude::*;

    #[test]
    fn test_equal_split() {
        assert_eq!(equal_split(10, 3), vec![4, 3, 3]);
        assert_eq!(equal_split(9, 3), vec![3, 3, 3]);
        assert_eq!(equal_split(2, 4), vec![1, 1, 0, 0]);
        assert!(equal_split(10, 0).is_empty());
    }

    #[test]
    fn test_breakdown_rows() {
        let inv = sample();
        let app = inv.application("app-om-gateway").unwrap();
        let rows = node_breakdown(&inv, app, &Thresholds::default());

        let ids: Vec<&str> = rows.iter().map(|r| r.node_id.as_str()).collect();
        assert_eq!(ids, vec!["node-01", "node-02", "node-03"]);
        assert_eq!(rows.iter().map(|r| r.hits).sum::<u64>(), 62500);
        assert_eq!(rows[0].hits, 20834);
        assert_eq!(rows[1].hits, 20833);
        assert!(rows.iter().all(|r| r.response_time == 142.0 && r.error_rate == 0.4));

        assert_eq!(rows[0].status, HealthStatus::Healthy);
        // node-03 runs at 88% CPU
        assert_eq!(rows[2].status, HealthStatus::Critical);
    }

    #[test]
    fn test_breakdown_is_deterministic() {
        let inv = sample();
        let app = inv.application("app-om-gateway").unwrap();
        let t = Thresholds::default();
        assert_eq!(node_breakdown(&inv, app, &t), node_breakdown(&inv, app, &t));
    }

    #[test]
    fn test_unknown_nodes_are_skipped() {
        let inv = sample();
        let mut app = inv.application("app-order-validation").unwrap().clone();
        app.nodes.push("node-missing".into());
        let rows = node_breakdown(&inv, &app, &Thresholds::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].hits, app.total_hits);
        assert_eq!(rows[0].status, HealthStatus::Critical);
    }

    proptest! {
        #[test]
        fn split_sums_to_total(total in 0u64..10_000_000, parts in 1usize..64) {
            let shares = equal_split(total, parts);
            prop_assert_eq!(shares.len(), parts);
            prop_assert_eq!(shares.iter().sum::<u64>(), total);
            let max = shares.iter().max().copied().unwrap_or(0);
            let min = shares.iter().min().copied().unwrap_or(0);
            prop_assert!(max - min <= 1);
        }
    }
}
