//! # nodewatch-types
//!
//! Wire types for the system health API of an application-server fleet.
//! The API serves three pre-aggregated payloads, all wrapped in a
//! `{"result": ...}` envelope:
//!
//! - **Cluster overview** ([`ClusterOverview`]): one [`NodeHealthStatus`]
//!   record per node, already classified by the server.
//! - **Node details** ([`NodeDetails`]): totals plus seven parallel time
//!   series for a single node ([`PerformanceMetrics`]).
//! - **Cluster insights** ([`ClusterInsights`]): a wide time-bucketed table
//!   keyed per node per metric, node status snapshots, and a stats card.
//!
//! The backend is loose about number encoding: the same field may arrive as
//! `"12.5"`, `12.5`, `""` or `null`. Such fields are typed as [`Numeric`],
//! which keeps whatever was sent and coerces to `f64` on read (anything that
//! is not a finite number reads as `0`).
//!
//! ## Features
//!
//! - `std` (default): Standard library support
//! - `serde`: Deserialization of the API payloads
//!
//! ## Example
//!
//! ```rust
//! use nodewatch_types::{NodeHealthStatus, Numeric};
//!
//! let node = NodeHealthStatus {
//!     node_id: "node-01".into(),
//!     node_name: "appserver01".into(),
//!     health_status: "WARNING".into(),
//!     avg_db_time_ms: Numeric::from("125.5"),
//!     ..Default::default()
//! };
//!
//! assert_eq!(node.avg_db_time_ms.value(), 125.5);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod cluster;
mod insights;
mod numeric;
mod performance;
mod range;

pub use cluster::*;
pub use insights::*;
pub use numeric::*;
pub use performance::*;
pub use range::*;

/// Wire format of every timestamp the API sends and accepts.
///
/// `YYYY-MM-DD HH:mm:ss`, local time, zero-padded, no offset suffix.
pub const WIRE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Treat an explicit JSON `null` the same as a missing field.
#[cfg(feature = "serde")]
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + serde::Deserialize<'de>,
{
    use serde::Deserialize;
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
