//! Problem identification for an application detail view.
//!
//! Findings are grouped in three categories. An empty category is shown with
//! its "none detected" message instead.

use serde::Serialize;

use super::breakdown::NodeAppDetail;
use super::classify::Thresholds;
use super::inventory::ApplicationMetric;

/// Node error rate, percent, counted as a node failure.
pub const NODE_FAILURE_ERROR_RATE: f64 = 3.0;
/// DB share, percent, above which query optimization is recommended.
pub const DB_OPTIMIZE_SHARE: f64 = 40.0;
/// More slow URLs than this call for a review.
pub const SLOW_URL_REVIEW: usize = 3;
/// Fewer hosting nodes than this call for scaling out.
pub const MIN_HOSTING_NODES: usize = 3;

pub const NO_CRITICAL: &str = "No critical issues detected";
pub const NO_WARNINGS: &str = "No warnings detected";
pub const PERFORMING_WELL: &str = "Application performing well";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub title: String,
    pub detail: String,
}

impl Finding {
    fn new(title: &str, detail: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Findings {
    pub critical: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub recommendations: Vec<Finding>,
}

impl Findings {
    /// Message shown when there are no critical findings.
    pub fn critical_placeholder(&self) -> Option<&'static str> {
        self.critical.is_empty().then_some(NO_CRITICAL)
    }

    pub fn warnings_placeholder(&self) -> Option<&'static str> {
        self.warnings.is_empty().then_some(NO_WARNINGS)
    }

    pub fn recommendations_placeholder(&self) -> Option<&'static str> {
        self.recommendations.is_empty().then_some(PERFORMING_WELL)
    }
}

/// Evaluate an application and its node breakdown.
pub fn application_findings(
    app: &ApplicationMetric,
    breakdown: &[NodeAppDetail],
    thresholds: &Thresholds,
) -> Findings {
    let mut findings = Findings::default();

    if app.error_rate > thresholds.error_rate_critical {
        findings.critical.push(Finding::new(
            "High Error Rate",
            format!(
                "Error rate at {}%, exceeding {}% threshold",
                app.error_rate, thresholds.error_rate_critical
            ),
        ));
    }
    if thresholds.is_severe_latency(app.avg_response_time) {
        findings.critical.push(Finding::new(
            "Severe Latency",
            format!(
                "Avg response time {}ms, critical threshold exceeded",
                app.avg_response_time
            ),
        ));
    }
    let failing = breakdown
        .iter()
        .filter(|n| n.error_rate > NODE_FAILURE_ERROR_RATE)
        .count();
    if failing > 0 {
        findings.critical.push(Finding::new(
            "Node Failures",
            format!("{failing} node(s) reporting critical error rates"),
        ));
    }

    if app.avg_response_time > thresholds.response_critical_ms
        && !thresholds.is_severe_latency(app.avg_response_time)
    {
        findings.warnings.push(Finding::new(
            "High Latency",
            format!(
                "Response time approaching threshold at {}ms",
                app.avg_response_time
            ),
        ));
    }
    if app.db_time_percent > thresholds.db_share_flag {
        findings.warnings.push(Finding::new(
            "DB Bottleneck",
            format!("{}% time spent in database queries", app.db_time_percent),
        ));
    }
    let hot = breakdown
        .iter()
        .filter(|n| n.cpu_percent > thresholds.cpu_critical)
        .count();
    if hot > 0 {
        findings.warnings.push(Finding::new(
            "High CPU Usage",
            format!(
                "{hot} node(s) with CPU above {}%",
                thresholds.cpu_critical
            ),
        ));
    }

    if app.db_time_percent > DB_OPTIMIZE_SHARE {
        findings.recommendations.push(Finding::new(
            "Optimize DB Queries",
            "Consider indexing or query optimization to reduce DB time",
        ));
    }
    if app.top_slow_urls.len() > SLOW_URL_REVIEW {
        findings.recommendations.push(Finding::new(
            "Address Slow URLs",
            format!("{} URLs need performance review", app.top_slow_urls.len()),
        ));
    }
    if breakdown.len() < MIN_HOSTING_NODES {
        findings.recommendations.push(Finding::new(
            "Scale Horizontally",
            "Consider adding more nodes for better load distribution",
        ));
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::breakdown::node_breakdown;
    use crate::data::inventory::tests::sample;

    fn titles(list: &[Finding]) -> Vec<&str> {
        list.iter().map(|f| f.title.as_str()).collect()
    }

    #[test]
    fn test_order_validation_findings() {
        let inv = sample();
        let t = Thresholds::default();
        let app = inv.application("app-order-validation").unwrap();
        let rows = node_breakdown(&inv, app, &t);
        let f = application_findings(app, &rows, &t);

        assert_eq!(titles(&f.critical), vec!["High Error Rate"]);
        assert_eq!(
            f.critical[0].detail,
            "Error rate at 2.4%, exceeding 2% threshold"
        );
        assert_eq!(titles(&f.warnings), vec!["High Latency", "DB Bottleneck"]);
        assert_eq!(
            f.warnings[0].detail,
            "Response time approaching threshold at 335ms"
        );
        assert_eq!(
            titles(&f.recommendations),
            vec!["Optimize DB Queries", "Scale Horizontally"]
        );
        assert_eq!(f.critical_placeholder(), None);
    }

    #[test]
    fn test_gateway_findings() {
        let inv = sample();
        let t = Thresholds::default();
        let app = inv.application("app-om-gateway").unwrap();
        let rows = node_breakdown(&inv, app, &t);
        let f = application_findings(app, &rows, &t);

        assert!(f.critical.is_empty());
        assert_eq!(f.critical_placeholder(), Some(NO_CRITICAL));
        // node-03 runs at 88% CPU
        assert_eq!(titles(&f.warnings), vec!["High CPU Usage"]);
        assert_eq!(f.warnings[0].detail, "1 node(s) with CPU above 85%");
        assert_eq!(titles(&f.recommendations), vec!["Optimize DB Queries"]);
    }

    #[test]
    fn test_severe_latency_is_not_a_warning() {
        let app = ApplicationMetric {
            avg_response_time: 450.0,
            ..Default::default()
        };
        let f = application_findings(&app, &[], &Thresholds::default());
        assert_eq!(titles(&f.critical), vec!["Severe Latency"]);
        assert!(f.warnings.is_empty());
        assert_eq!(f.warnings_placeholder(), Some(NO_WARNINGS));
    }

    #[test]
    fn test_node_failures_and_slow_urls() {
        let app = ApplicationMetric {
            top_slow_urls: vec!["/a".into(), "/b".into(), "/c".into(), "/d".into()],
            ..Default::default()
        };
        let row = |id: &str, err: f64| NodeAppDetail {
            node_id: id.into(),
            node_name: id.into(),
            cpu_percent: 10.0,
            memory_percent: 10.0,
            response_time: 0.0,
            hits: 0,
            error_rate: err,
            status: Default::default(),
        };
        let rows = vec![row("a", 3.5), row("b", 3.0), row("c", 4.0)];
        let f = application_findings(&app, &rows, &Thresholds::default());
        assert_eq!(f.critical[0].detail, "2 node(s) reporting critical error rates");
        assert_eq!(titles(&f.recommendations), vec!["Address Slow URLs"]);
        assert_eq!(f.recommendations[0].detail, "4 URLs need performance review");
    }

    #[test]
    fn test_healthy_application() {
        let app = ApplicationMetric {
            avg_response_time: 120.0,
            db_time_percent: 20.0,
            ..Default::default()
        };
        let rows: Vec<NodeAppDetail> = (0..3)
            .map(|i| NodeAppDetail {
                node_id: format!("n{i}"),
                node_name: format!("n{i}"),
                cpu_percent: 30.0,
                memory_percent: 40.0,
                response_time: 120.0,
                hits: 10,
                error_rate: 0.0,
                status: Default::default(),
            })
            .collect();
        let f = application_findings(&app, &rows, &Thresholds::default());
        assert_eq!(f, Findings::default());
        assert_eq!(f.recommendations_placeholder(), Some(PERFORMING_WELL));
    }
}
