//! Fleet-wide aggregates over node and application collections.
//!
//! Every summary is a single fold over its input, so the result does not
//! depend on the order of the collection. Percentages and averages of an
//! empty collection are `0`.

use serde::Serialize;

use super::classify::{HealthStatus, Thresholds};
use super::inventory::{ApplicationMetric, NodeMetric};

/// Entity counts per health tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatusCounts {
    pub healthy: usize,
    pub warning: usize,
    pub critical: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: HealthStatus) {
        match status {
            HealthStatus::Healthy => self.healthy += 1,
            HealthStatus::Warning => self.warning += 1,
            HealthStatus::Critical => self.critical += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.healthy + self.warning + self.critical
    }

    pub fn get(&self, status: HealthStatus) -> usize {
        match status {
            HealthStatus::Healthy => self.healthy,
            HealthStatus::Warning => self.warning,
            HealthStatus::Critical => self.critical,
        }
    }

    /// Share of each tier in percent.
    pub fn shares(&self) -> StatusShares {
        let total = self.total();
        StatusShares {
            healthy: percentage(self.healthy, total),
            warning: percentage(self.warning, total),
            critical: percentage(self.critical, total),
        }
    }

    /// Worst tier present, `Healthy` for an empty collection.
    pub fn overall(&self) -> HealthStatus {
        if self.critical > 0 {
            HealthStatus::Critical
        } else if self.warning > 0 {
            HealthStatus::Warning
        } else {
            HealthStatus::Healthy
        }
    }
}

/// Percent of entities per health tier.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct StatusShares {
    pub healthy: f64,
    pub warning: f64,
    pub critical: f64,
}

/// `count / total * 100`, or `0` when there is nothing to count.
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Mean of a sum over `count` items, `0` when empty.
pub fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Aggregates of the node collection.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NodeSummary {
    pub total: usize,
    pub counts: StatusCounts,
    pub shares: StatusShares,
    pub avg_cpu: f64,
    pub avg_memory: f64,
    pub avg_db_time: f64,
    pub total_transactions: u64,
    pub total_amb_rate: f64,
    pub max_queue_depth: u64,
}

/// Summarize a node collection.
///
/// CPU, memory and DB averages are rounded to whole numbers.
pub fn summarize_nodes(nodes: &[NodeMetric]) -> NodeSummary {
    #[derive(Default)]
    struct Acc {
        counts: StatusCounts,
        cpu: f64,
        memory: f64,
        db: f64,
        transactions: u64,
        amb: f64,
        max_queue: u64,
    }

    let acc = nodes.iter().fold(Acc::default(), |mut acc, n| {
        acc.counts.record(n.status);
        acc.cpu += n.cpu_percent;
        acc.memory += n.jvm_memory_percent;
        acc.db += n.db_response_time;
        acc.transactions += n.active_transactions;
        acc.amb += n.amb_rate;
        acc.max_queue = acc.max_queue.max(n.thread_queue_depth);
        acc
    });

    let total = acc.counts.total();
    NodeSummary {
        total,
        counts: acc.counts,
        shares: acc.counts.shares(),
        avg_cpu: mean(acc.cpu, total).round(),
        avg_memory: mean(acc.memory, total).round(),
        avg_db_time: mean(acc.db, total).round(),
        total_transactions: acc.transactions,
        total_amb_rate: acc.amb,
        max_queue_depth: acc.max_queue,
    }
}

/// Aggregates of the application collection.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ApplicationSummary {
    pub total: usize,
    pub counts: StatusCounts,
    pub shares: StatusShares,
    pub total_hits: u64,
    pub avg_response_time: f64,
    pub avg_error_rate: f64,
    /// Applications whose average response time is above the critical line.
    pub slow_count: usize,
}

/// Summarize an application collection.
///
/// Response time is averaged to a whole number, error rate to one decimal.
pub fn summarize_applications(
    apps: &[ApplicationMetric],
    thresholds: &Thresholds,
) -> ApplicationSummary {
    #[derive(Default)]
    struct Acc {
        counts: StatusCounts,
        hits: u64,
        response: f64,
        errors: f64,
        slow: usize,
    }

    let acc = apps.iter().fold(Acc::default(), |mut acc, a| {
        acc.counts.record(a.status);
        acc.hits += a.total_hits;
        acc.response += a.avg_response_time;
        acc.errors += a.error_rate;
        if a.avg_response_time > thresholds.response_critical_ms {
            acc.slow += 1;
        }
        acc
    });

    let total = acc.counts.total();
    ApplicationSummary {
        total,
        counts: acc.counts,
        shares: acc.counts.shares(),
        total_hits: acc.hits,
        avg_response_time: mean(acc.response, total).round(),
        avg_error_rate: round1(mean(acc.errors, total)),
        slow_count: acc.slow,
    }
}

/// Qualitative band of an average response time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResponseBand {
    Excellent,
    Fair,
    Poor,
}

impl ResponseBand {
    pub fn of(avg_response_ms: f64, thresholds: &Thresholds) -> Self {
        if avg_response_ms < thresholds.response_warning_ms {
            ResponseBand::Excellent
        } else if avg_response_ms < thresholds.response_severe_ms {
            ResponseBand::Fair
        } else {
            ResponseBand::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResponseBand::Excellent => "Excellent",
            ResponseBand::Fair => "Fair",
            ResponseBand::Poor => "Poor",
        }
    }
}

/// Whether a fleet error rate is above its target.
pub fn error_rate_above_target(avg_error_rate: f64, thresholds: &Thresholds) -> bool {
    avg_error_rate > thresholds.error_rate_warning
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::inventory::tests::sample;
    use proptest::prelude::*;

    fn node(status: HealthStatus, cpu: f64, queue: u64) -> NodeMetric {
        NodeMetric {
            cpu_percent: cpu,
            thread_queue_depth: queue,
            status,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_nodes() {
        let summary = summarize_nodes(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.counts, StatusCounts::default());
        assert_eq!(summary.shares, StatusShares::default());
        assert_eq!(summary.max_queue_depth, 0);
        assert_eq!(summary.avg_cpu, 0.0);
    }

    #[test]
    fn test_empty_applications() {
        let summary = summarize_applications(&[], &Thresholds::default());
        assert_eq!(summary.total, 0);
        assert_eq!(summary.avg_error_rate, 0.0);
        assert_eq!(summary.slow_count, 0);
    }

    #[test]
    fn test_node_summary() {
        let inv = sample();
        let s = summarize_nodes(&inv.nodes);
        assert_eq!(s.total, 3);
        assert_eq!(s.counts.healthy, 2);
        assert_eq!(s.counts.critical, 1);
        // (68 + 45 + 88) / 3 = 67.0
        assert_eq!(s.avg_cpu, 67.0);
        // (72 + 58 + 81) / 3 = 70.33
        assert_eq!(s.avg_memory, 70.0);
        assert_eq!(s.total_transactions, 145 + 98 + 210);
        assert_eq!(s.total_amb_rate, 2450.0 + 1890.0 + 3100.0);
        assert_eq!(s.max_queue_depth, 22);
        assert!((s.shares.healthy - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_application_summary() {
        let inv = sample();
        let s = summarize_applications(&inv.applications, &Thresholds::default());
        assert_eq!(s.total_hits, 62500 + 48920);
        // (142 + 335) / 2 = 238.5
        assert_eq!(s.avg_response_time, 239.0);
        // (0.4 + 2.4) / 2 = 1.4
        assert_eq!(s.avg_error_rate, 1.4);
        assert_eq!(s.slow_count, 1);
        assert_eq!(s.counts.critical, 1);
    }

    #[test]
    fn test_overall_status() {
        let mut counts = StatusCounts::default();
        assert_eq!(counts.overall(), HealthStatus::Healthy);
        counts.record(HealthStatus::Warning);
        assert_eq!(counts.overall(), HealthStatus::Warning);
        counts.record(HealthStatus::Critical);
        assert_eq!(counts.overall(), HealthStatus::Critical);
        assert_eq!(counts.get(HealthStatus::Critical), 1);
    }

    #[test]
    fn test_response_band() {
        let t = Thresholds::default();
        assert_eq!(ResponseBand::of(199.0, &t), ResponseBand::Excellent);
        assert_eq!(ResponseBand::of(200.0, &t), ResponseBand::Fair);
        assert_eq!(ResponseBand::of(399.0, &t), ResponseBand::Fair);
        assert_eq!(ResponseBand::of(400.0, &t), ResponseBand::Poor);
    }

    #[test]
    fn test_error_rate_target() {
        let t = Thresholds::default();
        assert!(!error_rate_above_target(1.0, &t));
        assert!(error_rate_above_target(1.1, &t));
    }

    #[test]
    fn test_summary_is_order_independent() {
        let mut nodes = vec![
            node(HealthStatus::Healthy, 10.0, 3),
            node(HealthStatus::Critical, 90.0, 30),
            node(HealthStatus::Warning, 72.0, 7),
        ];
        let forward = summarize_nodes(&nodes);
        nodes.reverse();
        assert_eq!(summarize_nodes(&nodes), forward);
    }

    fn status_strategy() -> impl Strategy<Value = HealthStatus> {
        prop_oneof![
            Just(HealthStatus::Healthy),
            Just(HealthStatus::Warning),
            Just(HealthStatus::Critical),
        ]
    }

    proptest! {
        #[test]
        fn shares_sum_to_hundred(statuses in proptest::collection::vec(status_strategy(), 0..50)) {
            let nodes: Vec<NodeMetric> =
                statuses.iter().map(|s| node(*s, 50.0, 1)).collect();
            let s = summarize_nodes(&nodes);
            let sum = s.shares.healthy + s.shares.warning + s.shares.critical;
            if nodes.is_empty() {
                prop_assert_eq!(sum, 0.0);
            } else {
                prop_assert!((sum - 100.0).abs() < 1e-9);
            }
        }

        #[test]
        fn max_queue_is_an_upper_bound(queues in proptest::collection::vec(0u64..1000, 0..30)) {
            let nodes: Vec<NodeMetric> =
                queues.iter().map(|q| node(HealthStatus::Healthy, 0.0, *q)).collect();
            let s = summarize_nodes(&nodes);
            prop_assert!(nodes.iter().all(|n| n.thread_queue_depth <= s.max_queue_depth));
            prop_assert_eq!(s.max_queue_depth, queues.iter().copied().max().unwrap_or(0));
        }
    }
}
