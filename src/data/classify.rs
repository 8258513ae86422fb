//! Threshold classification of individual metrics.
//!
//! Every metric the dashboard colors is mapped to a [`HealthStatus`] tier
//! against a fixed table of [`Thresholds`]. CPU and memory compare with
//! `>=`, response time and error rate with `>`; a value sitting exactly on
//! a boundary stays in the lower tier for the strict comparisons.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Health tier of a metric, node, application or fleet.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    #[default]
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "OK",
            HealthStatus::Warning => "WARN",
            HealthStatus::Critical => "CRIT",
        }
    }

    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::Warning => "Warning",
            HealthStatus::Critical => "Critical",
        }
    }

    /// Map a status string classified by the server.
    ///
    /// Accepts `NORMAL`/`HEALTHY`, `WARNING` and `CRITICAL` in any case.
    /// Anything else is treated as `Warning` so an unknown state is never
    /// shown as healthy.
    pub fn from_server(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "NORMAL" | "HEALTHY" => HealthStatus::Healthy,
            "WARNING" => HealthStatus::Warning,
            "CRITICAL" => HealthStatus::Critical,
            _ => {
                warn!(status = raw, "Unrecognized server health status");
                HealthStatus::Warning
            }
        }
    }
}

/// Metric families the classifier knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// CPU utilisation, percent.
    Cpu,
    /// JVM heap (or equivalent) utilisation, percent.
    Memory,
    /// Pending work items on a node.
    QueueDepth,
    /// Slow operations detected in the window.
    SlowPatterns,
    /// Average response time, milliseconds.
    ResponseTime,
    /// Error rate, percent.
    ErrorRate,
    /// Share of request time spent in the database, percent.
    DbTimeShare,
}

/// Classification thresholds.
///
/// Defaults are the standard table; every value can be overridden from the
/// `thresholds` section of the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub cpu_warning: f64,
    pub cpu_critical: f64,
    pub memory_warning: f64,
    pub memory_critical: f64,
    pub response_warning_ms: f64,
    pub response_critical_ms: f64,
    /// Latency beyond which an application is reported as severely slow.
    pub response_severe_ms: f64,
    pub error_rate_warning: f64,
    pub error_rate_critical: f64,
    pub queue_depth_flag: f64,
    pub slow_pattern_flag: f64,
    pub db_share_flag: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cpu_warning: 70.0,
            cpu_critical: 85.0,
            memory_warning: 75.0,
            memory_critical: 90.0,
            response_warning_ms: 200.0,
            response_critical_ms: 300.0,
            response_severe_ms: 400.0,
            error_rate_warning: 1.0,
            error_rate_critical: 2.0,
            queue_depth_flag: 15.0,
            slow_pattern_flag: 10.0,
            db_share_flag: 50.0,
        }
    }
}

impl Thresholds {
    /// Classify a single metric value.
    ///
    /// Flag-only metrics (queue depth, slow patterns, DB share) never reach
    /// `Critical`; crossing their flag yields `Warning`.
    pub fn classify(&self, kind: MetricKind, value: f64) -> HealthStatus {
        match kind {
            MetricKind::Cpu => tier_inclusive(value, self.cpu_warning, self.cpu_critical),
            MetricKind::Memory => tier_inclusive(value, self.memory_warning, self.memory_critical),
            MetricKind::ResponseTime => {
                tier_strict(value, self.response_warning_ms, self.response_critical_ms)
            }
            MetricKind::ErrorRate => {
                tier_strict(value, self.error_rate_warning, self.error_rate_critical)
            }
            MetricKind::QueueDepth | MetricKind::SlowPatterns | MetricKind::DbTimeShare => {
                if self.is_flagged(kind, value) {
                    HealthStatus::Warning
                } else {
                    HealthStatus::Healthy
                }
            }
        }
    }

    /// Whether the value crosses the metric's alerting flag.
    ///
    /// For tiered metrics this is anything above `Healthy`.
    pub fn is_flagged(&self, kind: MetricKind, value: f64) -> bool {
        match kind {
            MetricKind::QueueDepth => value > self.queue_depth_flag,
            MetricKind::SlowPatterns => value > self.slow_pattern_flag,
            MetricKind::DbTimeShare => value > self.db_share_flag,
            _ => self.classify(kind, value) != HealthStatus::Healthy,
        }
    }

    /// Whether a response time counts as severe latency.
    pub fn is_severe_latency(&self, response_ms: f64) -> bool {
        response_ms > self.response_severe_ms
    }
}

/// Classify against the default table.
pub fn classify(kind: MetricKind, value: f64) -> HealthStatus {
    Thresholds::default().classify(kind, value)
}

fn tier_inclusive(value: f64, warning: f64, critical: f64) -> HealthStatus {
    if value >= critical {
        HealthStatus::Critical
    } else if value >= warning {
        HealthStatus::Warning
    } else {
        HealthStatus::Healthy
    }
}

fn tier_strict(value: f64, warning: f64, critical: f64) -> HealthStatus {
    if value > critical {
        HealthStatus::Critical
    } else if value > warning {
        HealthStatus::Warning
    } else {
        HealthStatus::Healthy
    }
}
