//! Per-node history across refreshes, for sparklines and trends.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use super::fleet::FleetNode;
use super::trend::{detect_trend, Trend};

/// Maximum number of samples kept per node.
const MAX_HISTORY_SIZE: usize = 60;

/// Transaction totals of every node seen in successive overview snapshots.
#[derive(Debug, Clone, Default)]
pub struct History {
    /// node_id -> transaction totals, oldest first.
    pub node_transactions: HashMap<String, VecDeque<f64>>,
    /// node_id -> average transaction time, oldest first.
    pub node_latency: HashMap<String, VecDeque<f64>>,
    /// When each snapshot was recorded.
    pub timestamps: VecDeque<Instant>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one overview snapshot.
    pub fn record(&mut self, nodes: &[FleetNode], at: Instant) {
        for node in nodes {
            push_bounded(
                self.node_transactions.entry(node.node_id.clone()).or_default(),
                node.total_transactions as f64,
            );
            push_bounded(
                self.node_latency.entry(node.node_id.clone()).or_default(),
                node.avg_transaction_time_ms,
            );
        }

        self.timestamps.push_back(at);
        if self.timestamps.len() > MAX_HISTORY_SIZE {
            self.timestamps.pop_front();
        }
    }

    /// Number of recorded snapshots.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Forget everything, e.g. after the time range changed.
    pub fn clear(&mut self) {
        self.node_transactions.clear();
        self.node_latency.clear();
        self.timestamps.clear();
    }

    /// Sparkline levels (0-7) of a node's transaction totals.
    ///
    /// Empty until at least two samples exist.
    pub fn transactions_sparkline(&self, node_id: &str) -> Vec<u8> {
        normalize_sparkline(self.node_transactions.get(node_id))
    }

    /// Direction of a node's transaction totals.
    pub fn transactions_trend(&self, node_id: &str) -> Trend {
        trend_of(self.node_transactions.get(node_id))
    }

    /// Direction of a node's average transaction time.
    pub fn latency_trend(&self, node_id: &str) -> Trend {
        trend_of(self.node_latency.get(node_id))
    }
}

fn push_bounded(values: &mut VecDeque<f64>, value: f64) {
    values.push_back(value);
    if values.len() > MAX_HISTORY_SIZE {
        values.pop_front();
    }
}

fn trend_of(values: Option<&VecDeque<f64>>) -> Trend {
    match values {
        Some(values) => {
            let series: Vec<f64> = values.iter().copied().collect();
            detect_trend(&series)
        }
        None => Trend::Stable,
    }
}

/// Normalize values to the 0-7 range of the eight bar glyphs.
fn normalize_sparkline(data: Option<&VecDeque<f64>>) -> Vec<u8> {
    let Some(values) = data else {
        return Vec::new();
    };
    if values.len() < 2 {
        return Vec::new();
    }

    let max = values.iter().copied().fold(f64::MIN, f64::max);
    let min = values.iter().copied().fold(f64::MAX, f64::min);
    let range = max - min;

    values
        .iter()
        .map(|&v| {
            if range <= f64::EPSILON {
                0
            } else {
                (((v - min) / range) * 7.0).round().clamp(0.0, 7.0) as u8
            }
        })
        .collect()
}
