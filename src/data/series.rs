//! Mapping of backend time series into chart-ready points.
//!
//! Every node-detail series tags its samples with a `datetime` and keeps the
//! metric under its own key. [`map_series`] turns any of them into a uniform
//! list of [`ChartPoint`]s labelled by local `HH:MM`.

use nodewatch_types::{PerformanceMetrics, SeriesPoint};
use serde::Serialize;

use super::timerange::parse_wire;

/// Label used for samples whose timestamp cannot be read.
pub const UNKNOWN_TIME: &str = "--:--";

/// One chart sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub time: String,
    pub value: f64,
}

/// Map raw samples to chart points, reading the value stored under `key`.
///
/// Produces exactly one point per input sample in the same order. Missing
/// or non-numeric values read as `0`.
pub fn map_series(points: &[SeriesPoint], key: &str) -> Vec<ChartPoint> {
    points
        .iter()
        .map(|p| ChartPoint {
            time: time_label(&p.datetime).unwrap_or_else(|| UNKNOWN_TIME.to_string()),
            value: p.value(key),
        })
        .collect()
}

/// `HH:MM` label of an API timestamp, if it parses.
pub fn time_label(datetime: &str) -> Option<String> {
    parse_wire(datetime).map(|dt| dt.format("%H:%M").to_string())
}

/// Plain values of a chart series.
pub fn values(points: &[ChartPoint]) -> Vec<f64> {
    points.iter().map(|p| p.value).collect()
}

/// The seven node-detail series, chart ready, plus the node totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodePerformance {
    pub total_transactions: f64,
    pub total_db_queries: f64,
    pub avg_transaction_time_ms: f64,
    pub avg_db_time_ms: f64,
    pub response_time: Vec<ChartPoint>,
    pub db_time: Vec<ChartPoint>,
    pub db_queries: Vec<ChartPoint>,
    pub cpu_time: Vec<ChartPoint>,
    pub wait_time: Vec<ChartPoint>,
    pub network_time: Vec<ChartPoint>,
    pub browser_time: Vec<ChartPoint>,
}

impl NodePerformance {
    pub fn from_metrics(metrics: &PerformanceMetrics) -> Self {
        Self {
            total_transactions: metrics.total_transactions.value(),
            total_db_queries: metrics.total_db_queries.value(),
            avg_transaction_time_ms: metrics.avg_transaction_time_ms.value(),
            avg_db_time_ms: metrics.avg_db_time_ms.value(),
            response_time: map_series(&metrics.response_time_ms, "response_time_ms"),
            db_time: map_series(&metrics.db_time_ms, "db_time_ms"),
            db_queries: map_series(&metrics.db_query_count, "db_query_count"),
            cpu_time: map_series(&metrics.cpu_time_ms, "cpu_time_ms"),
            wait_time: map_series(&metrics.wait_time_ms, "wait_time_ms"),
            network_time: map_series(&metrics.network_time_ms, "network_time_ms"),
            browser_time: map_series(&metrics.browser_time_ms, "browser_time_ms"),
        }
    }

    /// Titled series in display order.
    pub fn series(&self) -> [(&'static str, &[ChartPoint]); 7] {
        [
            ("Response time (ms)", self.response_time.as_slice()),
            ("DB time (ms)", self.db_time.as_slice()),
            ("DB queries", self.db_queries.as_slice()),
            ("CPU time (ms)", self.cpu_time.as_slice()),
            ("Wait time (ms)", self.wait_time.as_slice()),
            ("Network time (ms)", self.network_time.as_slice()),
            ("Browser time (ms)", self.browser_time.as_slice()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodewatch_types::Numeric;
    use proptest::prelude::*;

    #[test]
    fn test_empty_input() {
        assert!(map_series(&[], "response_time_ms").is_empty());
    }

    #[test]
    fn test_labels_and_values() {
        let points = vec![
            SeriesPoint::new("2024-01-02 09:05:00", "db_time_ms", Numeric::from("12.5")),
            SeriesPoint::new("2024-01-02 14:30:59", "db_time_ms", Numeric::from(40.0)),
        ];
        let mapped = map_series(&points, "db_time_ms");
        assert_eq!(
            mapped,
            vec![
                ChartPoint { time: "09:05".into(), value: 12.5 },
                ChartPoint { time: "14:30".into(), value: 40.0 },
            ]
        );
    }

    #[test]
    fn test_bad_values_and_times_are_kept() {
        let points = vec![
            SeriesPoint::new("garbage", "cpu_time_ms", Numeric::from("n/a")),
            SeriesPoint::new("2024-01-02 09:00:00", "other_key", Numeric::from(5.0)),
            SeriesPoint::new("2024-01-02 09:10:00", "cpu_time_ms", Numeric::Null),
        ];
        let mapped = map_series(&points, "cpu_time_ms");
        assert_eq!(mapped.len(), 3);
        assert_eq!(mapped[0].time, UNKNOWN_TIME);
        assert_eq!(values(&mapped), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_node_performance_maps_all_series() {
        let metrics = PerformanceMetrics {
            total_transactions: Numeric::from(1200u64),
            avg_db_time_ms: Numeric::from("88"),
            response_time_ms: vec![SeriesPoint::new(
                "2024-01-02 09:00:00",
                "response_time_ms",
                Numeric::from("300"),
            )],
            browser_time_ms: vec![
                SeriesPoint::new("2024-01-02 09:00:00", "browser_time_ms", Numeric::from(1.0)),
                SeriesPoint::new("2024-01-02 09:05:00", "browser_time_ms", Numeric::from(2.0)),
            ],
            ..Default::default()
        };

        let perf = NodePerformance::from_metrics(&metrics);
        assert_eq!(perf.total_transactions, 1200.0);
        assert_eq!(perf.avg_db_time_ms, 88.0);
        assert_eq!(perf.response_time[0].value, 300.0);
        assert_eq!(perf.browser_time.len(), 2);
        assert!(perf.wait_time.is_empty());
        assert_eq!(perf.series().len(), 7);
    }

    proptest! {
        #[test]
        fn output_length_matches_input(raw in proptest::collection::vec(".*", 0..30)) {
            let points: Vec<SeriesPoint> = raw
                .iter()
                .map(|v| SeriesPoint::new("2024-01-02 09:00:00", "v", Numeric::from(v.as_str())))
                .collect();
            let mapped = map_series(&points, "v");
            prop_assert_eq!(mapped.len(), points.len());
            prop_assert!(mapped.iter().all(|p| p.value.is_finite()));
        }
    }
}
