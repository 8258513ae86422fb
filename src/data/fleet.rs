//! Fleet overview and comparative insights.
//!
//! Overview records come classified by the server, and that status is
//! trusted as is. The insights table is wide: one row per time bucket, one
//! column per `<node>_<metric>` pair. [`pivot_insights`] turns it into one
//! series per node.

use chrono::NaiveDateTime;
use nodewatch_types::{coerce, ClusterInsights, ClusterOverview, NodeHealthStatus, Numeric};
use serde::Serialize;

use super::classify::HealthStatus;
use super::filter::FilterCriteria;
use super::series::{time_label, ChartPoint, UNKNOWN_TIME};
use super::status::Classified;
use super::summary::{mean, StatusCounts, StatusShares};
use super::timerange::{heartbeat_within, RangeToken};

/// One node of the cluster overview, with numbers coerced.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FleetNode {
    pub node_id: String,
    pub node_name: String,
    pub system_id: String,
    pub status: HealthStatus,
    /// Operational state string (`online`, ...).
    pub state: String,
    pub participation: String,
    pub amb_status: String,
    pub last_heartbeat: String,
    pub avg_db_time_ms: f64,
    pub avg_queue_length_ms: f64,
    pub avg_transaction_time_ms: f64,
    pub slow_transaction_percent: f64,
    pub total_transactions: u64,
    pub reasons: Vec<String>,
}

impl FleetNode {
    pub fn from_wire(raw: &NodeHealthStatus) -> Self {
        Self {
            node_id: raw.node_id.clone(),
            node_name: raw.node_name.clone(),
            system_id: raw.system_id.clone(),
            status: HealthStatus::from_server(&raw.health_status),
            state: raw.status.clone(),
            participation: raw.participation.clone(),
            amb_status: raw.amb_status.clone(),
            last_heartbeat: raw.last_heartbeat.clone(),
            avg_db_time_ms: raw.avg_db_time_ms.value(),
            avg_queue_length_ms: raw.avg_queue_length_ms.value(),
            avg_transaction_time_ms: raw.avg_transaction_time_ms.value(),
            slow_transaction_percent: raw.slow_transaction_percent.value(),
            total_transactions: raw.total_transactions.value().max(0.0).round() as u64,
            reasons: raw.reasons.clone(),
        }
    }

    pub fn heartbeat_within(&self, token: RangeToken, now: NaiveDateTime) -> bool {
        heartbeat_within(&self.last_heartbeat, token, now)
    }
}

impl Classified for FleetNode {
    fn status(&self) -> HealthStatus {
        self.status
    }

    fn display_name(&self) -> &str {
        &self.node_name
    }
}

/// Map every overview record.
pub fn fleet_nodes(overview: &ClusterOverview) -> Vec<FleetNode> {
    overview.data.iter().map(FleetNode::from_wire).collect()
}

/// Apply the filter bar and, when given, a heartbeat recency window.
pub fn filter_fleet<'a>(
    nodes: &'a [FleetNode],
    criteria: &FilterCriteria,
    recency: Option<(RangeToken, NaiveDateTime)>,
) -> Vec<&'a FleetNode> {
    nodes
        .iter()
        .filter(|n| criteria.matches(*n))
        .filter(|n| match recency {
            Some((token, now)) => n.heartbeat_within(token, now),
            None => true,
        })
        .collect()
}

/// Aggregates of the overview, by server status.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FleetSummary {
    pub total: usize,
    pub counts: StatusCounts,
    pub shares: StatusShares,
    pub total_transactions: u64,
    pub avg_transaction_time_ms: f64,
    pub avg_db_time_ms: f64,
}

pub fn summarize_fleet(nodes: &[FleetNode]) -> FleetSummary {
    let (counts, transactions, txn_time, db_time) = nodes.iter().fold(
        (StatusCounts::default(), 0u64, 0.0, 0.0),
        |(mut counts, txns, txn_time, db_time), n| {
            counts.record(n.status);
            (
                counts,
                txns + n.total_transactions,
                txn_time + n.avg_transaction_time_ms,
                db_time + n.avg_db_time_ms,
            )
        },
    );

    let total = counts.total();
    FleetSummary {
        total,
        counts,
        shares: counts.shares(),
        total_transactions: transactions,
        avg_transaction_time_ms: mean(txn_time, total).round(),
        avg_db_time_ms: mean(db_time, total).round(),
    }
}

/// Metric columns of the insights table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InsightMetric {
    Cpu,
    Memory,
    Transactions,
    Db,
    Amb,
    Queue,
    AvgResponse,
}

impl InsightMetric {
    pub const ALL: [InsightMetric; 7] = [
        InsightMetric::AvgResponse,
        InsightMetric::Queue,
        InsightMetric::Transactions,
        InsightMetric::Db,
        InsightMetric::Cpu,
        InsightMetric::Memory,
        InsightMetric::Amb,
    ];

    /// Column suffix after `<node>_`.
    pub fn suffix(&self) -> &'static str {
        match self {
            InsightMetric::Cpu => "cpu",
            InsightMetric::Memory => "memory",
            InsightMetric::Transactions => "transactions",
            InsightMetric::Db => "db",
            InsightMetric::Amb => "amb",
            InsightMetric::Queue => "queue",
            InsightMetric::AvgResponse => "avg_response",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            InsightMetric::Cpu => "CPU %",
            InsightMetric::Memory => "Memory %",
            InsightMetric::Transactions => "Active transactions",
            InsightMetric::Db => "DB response (ms)",
            InsightMetric::Amb => "AMB rate",
            InsightMetric::Queue => "Queue depth",
            InsightMetric::AvgResponse => "Average response (ms)",
        }
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

/// One node's line in a comparative chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSeries {
    pub node_id: String,
    pub node_name: String,
    pub status: HealthStatus,
    pub points: Vec<ChartPoint>,
}

/// Pivot the wide table into one series per node listed in `node_statuses`.
///
/// Columns are looked up under the node name first and then under the node
/// id. Missing cells read as `0`, so every series has one point per row.
pub fn pivot_insights(insights: &ClusterInsights, metric: InsightMetric) -> Vec<NodeSeries> {
    let labels: Vec<String> = insights.data.iter().map(|row| row_label(row.get("time"))).collect();

    insights
        .node_statuses
        .iter()
        .map(|node| {
            let by_name = format!("{}_{}", node.node_name, metric.suffix());
            let by_id = format!("{}_{}", node.node_id, metric.suffix());
            let key = if insights.data.iter().any(|row| row.contains_key(&by_name)) {
                by_name
            } else {
                by_id
            };

            let points = insights
                .data
                .iter()
                .zip(&labels)
                .map(|(row, time)| ChartPoint {
                    time: time.clone(),
                    value: coerce(row.get(&key).and_then(|v| v.as_ref())),
                })
                .collect();

            NodeSeries {
                node_id: node.node_id.clone(),
                node_name: node.node_name.clone(),
                status: HealthStatus::from_server(&node.health_status),
                points,
            }
        })
        .collect()
}

// Buckets carry either a timestamp or a preformatted label
fn row_label(raw: Option<&Option<Numeric>>) -> String {
    match raw.and_then(|v| v.as_ref()) {
        Some(Numeric::Text(text)) => time_label(text).unwrap_or_else(|| text.clone()),
        Some(Numeric::Number(n)) => n.to_string(),
        _ => UNKNOWN_TIME.to_string(),
    }
}

/// The server's stats card, coerced.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ClusterStats {
    pub avg_cpu: f64,
    pub avg_memory: f64,
    pub avg_db_time_ms: f64,
    pub total_amb: f64,
    pub total_transactions: f64,
    pub max_queue: f64,
}

impl ClusterStats {
    pub fn from_insights(insights: &ClusterInsights) -> Self {
        let card = &insights.stats_card;
        Self {
            avg_cpu: card.avg_cpu.value(),
            avg_memory: card.avg_memory.value(),
            avg_db_time_ms: card.avg_db_time_ms.value(),
            total_amb: card.total_amb.value(),
            total_transactions: card.total_txns.value(),
            max_queue: card.max_queue.value(),
        }
    }
}
