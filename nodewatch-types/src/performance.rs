//! Node details payload: totals and per-node time series.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::{coerce, DateStamp, Numeric};

/// One timestamped sample of a node time series.
///
/// Every series tags its samples with `datetime` and `sys_id`; the metric
/// itself sits under a series-specific key (`response_time_ms`,
/// `db_query_count`, ...), which lands in `values`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SeriesPoint {
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub datetime: String,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub sys_id: String,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub values: BTreeMap<String, Option<Numeric>>,
}

impl SeriesPoint {
    /// Create a point carrying a single named value.
    pub fn new(datetime: impl Into<String>, key: impl Into<String>, value: Numeric) -> Self {
        let mut values = BTreeMap::new();
        values.insert(key.into(), Some(value));
        Self {
            datetime: datetime.into(),
            sys_id: String::new(),
            values,
        }
    }

    /// Numeric value of the named field; missing or non-numeric reads as `0`.
    pub fn value(&self, key: &str) -> f64 {
        coerce(self.values.get(key).and_then(|v| v.as_ref()))
    }
}

/// `data` of the node details endpoint.
///
/// The seven series run in parallel over the same time buckets.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PerformanceMetrics {
    pub total_transactions: Numeric,
    pub total_db_queries: Numeric,
    pub avg_transaction_time_ms: Numeric,
    pub avg_db_time_ms: Numeric,

    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub response_time_ms: Vec<SeriesPoint>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub db_time_ms: Vec<SeriesPoint>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub db_query_count: Vec<SeriesPoint>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub cpu_time_ms: Vec<SeriesPoint>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub wait_time_ms: Vec<SeriesPoint>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub network_time_ms: Vec<SeriesPoint>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub browser_time_ms: Vec<SeriesPoint>,
}

/// `result` of the node details endpoint.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NodeDetails {
    pub data: PerformanceMetrics,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub start_date: DateStamp,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub end_date: DateStamp,
}
