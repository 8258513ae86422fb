//! Derivation layer: everything the dashboard computes from raw metrics.
//!
//! Nothing in here does I/O except [`Inventory::load`]. The functions are
//! total: missing or non-numeric inputs degrade to `0`, `Stable` or an empty
//! collection.
//!
//! ## Submodules
//!
//! - [`classify`]: metric value → [`HealthStatus`] against [`Thresholds`]
//! - [`status`]: entity status as the worst of its metric tiers
//! - [`trend`]: up/down/stable direction of a short series
//! - [`timerange`]: range tokens → absolute wire timestamps
//! - [`series`]: backend time series → chart points
//! - [`summary`]: counts, shares, averages and totals over collections
//! - [`filter`]: search/status/critical-only predicates
//! - [`inventory`]: node and application records loaded from JSON
//! - [`breakdown`]: per-node rows of an application
//! - [`findings`]: critical issues, warnings and recommendations
//! - [`fleet`]: cluster overview and comparative insights
//! - [`history`]: per-node samples across refreshes
//!
//! ## Data Flow
//!
//! ```text
//! ClusterOverview ──▶ fleet_nodes() ──▶ summarize_fleet()
//!                           │
//!                           ├──▶ filter_fleet() ──▶ rendered table
//!                           └──▶ History::record() (sparklines)
//!
//! Inventory ──▶ summarize_nodes() / summarize_applications()
//!     │
//!     └──▶ node_breakdown() ──▶ application_findings()
//! ```

pub mod breakdown;
pub mod classify;
pub mod filter;
pub mod findings;
pub mod fleet;
pub mod history;
pub mod inventory;
pub mod series;
pub mod status;
pub mod summary;
pub mod timerange;
pub mod trend;

pub use breakdown::{node_breakdown, NodeAppDetail};
pub use classify::{classify, HealthStatus, MetricKind, Thresholds};
pub use filter::{FilterCriteria, StatusFilter};
pub use findings::{application_findings, Finding, Findings};
pub use fleet::{
    filter_fleet, fleet_nodes, pivot_insights, summarize_fleet, ClusterStats, FleetNode,
    FleetSummary, InsightMetric, NodeSeries,
};
pub use history::History;
pub use inventory::{ApplicationMetric, Inventory, NodeMetric};
pub use series::{map_series, ChartPoint, NodePerformance};
pub use status::{worst, Classified};
pub use summary::{
    summarize_applications, summarize_nodes, ApplicationSummary, NodeSummary, ResponseBand,
    StatusCounts,
};
pub use timerange::{resolve, RangeToken};
pub use trend::{detect_trend, Trend};
