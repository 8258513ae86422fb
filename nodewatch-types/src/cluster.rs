//! Cluster overview payload.

use alloc::string::String;
use alloc::vec::Vec;

use crate::{DateStamp, Numeric};

/// The `{"result": ...}` wrapper every endpoint responds with.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ApiEnvelope<T> {
    pub result: T,
}

/// Server-side health record for one node in the cluster overview.
///
/// `health_status` is classified by the server (`NORMAL`, `WARNING` or
/// `CRITICAL`) and is authoritative for the fleet overview.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NodeHealthStatus {
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub node_id: String,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub node_name: String,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub system_id: String,

    /// Server-classified health: `NORMAL`, `WARNING` or `CRITICAL`.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub health_status: String,

    /// Liveness, e.g. `online` / `offline`.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub status: String,

    /// `primary` or `secondary`.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub participation: String,

    /// AMB (message bus) state: `NORMAL` or `WARNING`.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub amb_status: String,

    /// `YYYY-MM-DD HH:mm:ss` of the last heartbeat.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub last_heartbeat: String,

    pub avg_db_time_ms: Numeric,
    pub avg_queue_length_ms: Numeric,
    pub avg_transaction_time_ms: Numeric,
    pub slow_transaction_percent: Numeric,
    pub total_transactions: Numeric,

    /// Why the server chose the health status, when it says.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub reasons: Vec<String>,
}

/// `result` of the cluster overview endpoint.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClusterOverview {
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub data: Vec<NodeHealthStatus>,
    pub count: Numeric,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub start_date: DateStamp,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub end_date: DateStamp,
}

impl ClusterOverview {
    /// Number of node records actually present.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the overview carries no nodes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Look up a node record by id.
    pub fn node(&self, node_id: &str) -> Option<&NodeHealthStatus> {
        self.data.iter().find(|n| n.node_id == node_id)
    }
}
