//! Entity-level status derivation.
//!
//! An entity's status is the worst tier among its constituent metrics.
//! Nodes are judged on CPU and memory; queue depth and slow patterns only
//! raise alert flags. Applications are judged on response time and error
//! rate.

use super::classify::{HealthStatus, MetricKind, Thresholds};

/// Anything that carries a health tier and a name to search on.
pub trait Classified {
    fn status(&self) -> HealthStatus;
    fn display_name(&self) -> &str;
}

/// Worst (highest severity) tier of the given statuses; `Healthy` when empty.
pub fn worst<I>(statuses: I) -> HealthStatus
where
    I: IntoIterator<Item = HealthStatus>,
{
    statuses.into_iter().max().unwrap_or(HealthStatus::Healthy)
}

/// Status of a node from its CPU and memory utilisation.
pub fn node_status(thresholds: &Thresholds, cpu_percent: f64, memory_percent: f64) -> HealthStatus {
    worst([
        thresholds.classify(MetricKind::Cpu, cpu_percent),
        thresholds.classify(MetricKind::Memory, memory_percent),
    ])
}

/// Status of an application from its latency and error rate.
pub fn application_status(
    thresholds: &Thresholds,
    avg_response_ms: f64,
    error_rate: f64,
) -> HealthStatus {
    worst([
        thresholds.classify(MetricKind::ResponseTime, avg_response_ms),
        thresholds.classify(MetricKind::ErrorRate, error_rate),
    ])
}
