//! Application state and navigation logic.

use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Local;
use nodewatch_types::{ClusterInsights, TimeRange};
use serde::Serialize;
use tracing::{info, warn};

use crate::data::findings::application_findings;
use crate::data::fleet::{filter_fleet, fleet_nodes, summarize_fleet, ClusterStats, FleetNode};
use crate::data::summary::{summarize_applications, summarize_nodes, ResponseBand};
use crate::data::timerange::{resolve, RangeToken};
use crate::data::{
    node_breakdown, ApplicationMetric, ApplicationSummary, FilterCriteria, Findings,
    FleetSummary, History, InsightMetric, Inventory, NodeAppDetail, NodePerformance,
    NodeSummary, Thresholds,
};
use crate::source::{DataSource, Payload, Request, RequestKind, RequestTracker, Response};
use crate::ui::nodes::{sort_nodes_by, SortColumn};
use crate::ui::Theme;

/// The current view/tab in the TUI.
///
/// Node and application details are overlays on top of their list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Cluster overview: one row per node, server-classified.
    Nodes,
    /// Inventory applications with node breakdown and findings.
    Applications,
    /// Comparative per-node charts.
    Insights,
}

impl View {
    pub const ALL: [View; 3] = [View::Nodes, View::Applications, View::Insights];

    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Nodes => View::Applications,
            View::Applications => View::Insights,
            View::Insights => View::Nodes,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Nodes => View::Insights,
            View::Applications => View::Nodes,
            View::Insights => View::Applications,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Nodes => "Nodes",
            View::Applications => "Applications",
            View::Insights => "Insights",
        }
    }
}

/// Node details currently shown in the detail overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDetailSnapshot {
    pub node_id: String,
    pub performance: NodePerformance,
}

/// Everything the views render from.
///
/// Snapshots are replaced wholesale when a response is accepted; derived
/// figures are recomputed from them on every read.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub range_token: RangeToken,
    /// Window of the requests issued last.
    pub range: TimeRange,
    pub filter: FilterCriteria,
    /// Only show nodes whose heartbeat falls inside the range.
    pub recent_only: bool,
    pub fleet: Vec<FleetNode>,
    pub node_detail: Option<NodeDetailSnapshot>,
    pub insights: Option<ClusterInsights>,
    pub inventory: Inventory,
    /// When the current overview arrived.
    pub last_updated: Option<Instant>,
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Data source
    source: Box<dyn DataSource>,
    tracker: RequestTracker,
    pub dashboard: Dashboard,
    pub history: History,
    // Failure of the latest accepted response, per kind
    fetch_errors: HashMap<RequestKind, String>,
    pub thresholds: Thresholds,

    // Navigation state
    pub selected_node_index: usize,
    pub selected_app_index: usize,

    // Sorting (Nodes view)
    pub sort_column: SortColumn,
    pub sort_ascending: bool,

    // Insights view
    pub insight_metric: InsightMetric,

    // Search input mode; the text lives in the filter criteria
    pub filter_active: bool,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App; nothing is requested until [`App::refresh`].
    pub fn new(
        source: Box<dyn DataSource>,
        thresholds: Thresholds,
        range_token: RangeToken,
        inventory: Inventory,
        theme: Theme,
    ) -> Self {
        Self {
            running: true,
            current_view: View::Nodes,
            show_help: false,
            show_detail_overlay: false,
            source,
            tracker: RequestTracker::new(),
            dashboard: Dashboard {
                range_token,
                inventory,
                ..Default::default()
            },
            history: History::new(),
            fetch_errors: HashMap::new(),
            thresholds,
            selected_node_index: 0,
            selected_app_index: 0,
            sort_column: SortColumn::default(),
            sort_ascending: true,
            insight_metric: InsightMetric::AvgResponse,
            filter_active: false,
            theme,
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Get breadcrumb trail for current navigation.
    pub fn breadcrumb(&self) -> String {
        let mut parts = vec![self.current_view.label().to_string()];
        if self.show_detail_overlay {
            let detail = match self.current_view {
                View::Nodes => self.selected_node().map(|n| n.node_name.clone()),
                View::Applications => self.selected_application().map(|a| a.name.clone()),
                View::Insights => None,
            };
            parts.extend(detail);
        }
        parts.join(" > ")
    }

    fn issue(&mut self, request: Request) {
        let seq = self.tracker.issue(request.kind());
        self.source.request(seq, request);
    }

    /// Resolve the range against now and request every visible snapshot.
    pub fn refresh(&mut self) {
        let range = resolve(self.dashboard.range_token);
        self.dashboard.range = range.clone();
        self.issue(Request::Overview(range.clone()));
        self.issue(Request::Insights(range.clone()));
        if let Some(node_id) = self.open_node_detail() {
            self.issue(Request::NodeDetail { node_id, range });
        }
    }

    /// Switch the time range and refetch.
    pub fn set_range(&mut self, token: RangeToken) {
        if token != self.dashboard.range_token {
            info!(range = %token, "Time range changed");
            self.dashboard.range_token = token;
            self.history.clear();
        }
        self.refresh();
    }

    /// Cycle 1h → 6h → 24h → all.
    pub fn cycle_range(&mut self) {
        let next = self.dashboard.range_token.next();
        self.set_range(next);
        self.set_status_message(format!("Range: {}", next));
    }

    /// Whether a request of `kind` is still in flight.
    pub fn is_loading(&self, kind: RequestKind) -> bool {
        self.tracker.is_loading(kind)
    }

    pub fn any_loading(&self) -> bool {
        self.tracker.any_loading()
    }

    /// Message of the current failure for `kind`, if its latest accepted
    /// response failed.
    pub fn fetch_error(&self, kind: RequestKind) -> Option<&str> {
        self.fetch_errors.get(&kind).map(String::as_str)
    }

    /// The first current failure across all kinds, for the status bar.
    pub fn load_error(&self) -> Option<String> {
        RequestKind::ALL.iter().find_map(|kind| {
            self.fetch_error(*kind)
                .map(|message| format!("{} fetch failed: {}", kind, message))
        })
    }

    /// Drain the source, applying responses that are still current.
    ///
    /// Returns true if any snapshot was replaced.
    pub fn poll_responses(&mut self) -> bool {
        let mut updated = false;
        while let Some(response) = self.source.poll() {
            if self.tracker.accept(&response) {
                updated |= self.apply(response);
            }
        }
        updated
    }

    fn apply(&mut self, response: Response) -> bool {
        match response.failure() {
            Some(message) => {
                warn!(kind = %response.kind, error = %message, "Keeping previous snapshot");
                self.fetch_errors.insert(response.kind, message.to_string());
            }
            None => {
                self.fetch_errors.remove(&response.kind);
            }
        }

        match response.payload {
            Payload::Overview(overview) => {
                let fleet = fleet_nodes(&overview);
                let now = Instant::now();
                info!(nodes = fleet.len(), "Cluster overview replaced");
                self.history.record(&fleet, now);
                self.dashboard.fleet = fleet;
                self.dashboard.last_updated = Some(now);
                self.clamp_selection();
                true
            }
            Payload::NodeDetail { node_id, details } => {
                info!(node = %node_id, "Node details replaced");
                self.dashboard.node_detail = Some(NodeDetailSnapshot {
                    node_id,
                    performance: NodePerformance::from_metrics(&details.data),
                });
                true
            }
            Payload::Insights(insights) => {
                info!(rows = insights.data.len(), "Cluster insights replaced");
                self.dashboard.insights = Some(insights);
                true
            }
            Payload::Failed { .. } => false,
        }
    }

    fn clamp_selection(&mut self) {
        let nodes = self.visible_nodes().len();
        self.selected_node_index = self.selected_node_index.min(nodes.saturating_sub(1));
        let apps = self.visible_applications().len();
        self.selected_app_index = self.selected_app_index.min(apps.saturating_sub(1));
    }

    /// Fleet nodes after filtering and sorting, in display order.
    pub fn visible_nodes(&self) -> Vec<&FleetNode> {
        let recency = self
            .dashboard
            .recent_only
            .then(|| (self.dashboard.range_token, Local::now().naive_local()));
        let mut nodes = filter_fleet(&self.dashboard.fleet, &self.dashboard.filter, recency);
        sort_nodes_by(&mut nodes, self.sort_column, self.sort_ascending);
        nodes
    }

    /// Inventory applications passing the filter, in inventory order.
    pub fn visible_applications(&self) -> Vec<&ApplicationMetric> {
        self.dashboard.filter.apply(&self.dashboard.inventory.applications)
    }

    pub fn selected_node(&self) -> Option<&FleetNode> {
        self.visible_nodes().get(self.selected_node_index).copied()
    }

    pub fn selected_application(&self) -> Option<&ApplicationMetric> {
        self.visible_applications().get(self.selected_app_index).copied()
    }

    fn open_node_detail(&self) -> Option<String> {
        if self.show_detail_overlay && self.current_view == View::Nodes {
            self.selected_node().map(|n| n.node_id.clone())
        } else {
            None
        }
    }

    pub fn fleet_summary(&self) -> FleetSummary {
        summarize_fleet(&self.dashboard.fleet)
    }

    pub fn node_summary(&self) -> NodeSummary {
        summarize_nodes(&self.dashboard.inventory.nodes)
    }

    pub fn application_summary(&self) -> ApplicationSummary {
        summarize_applications(&self.dashboard.inventory.applications, &self.thresholds)
    }

    pub fn cluster_stats(&self) -> Option<ClusterStats> {
        self.dashboard.insights.as_ref().map(ClusterStats::from_insights)
    }

    /// Node breakdown and findings of an application.
    pub fn application_detail(&self, app: &ApplicationMetric) -> (Vec<NodeAppDetail>, Findings) {
        let breakdown = node_breakdown(&self.dashboard.inventory, app, &self.thresholds);
        let findings = application_findings(app, &breakdown, &self.thresholds);
        (breakdown, findings)
    }

    /// Switch to the next view (cycles through Nodes → Applications → Insights).
    pub fn next_view(&mut self) {
        self.set_view(self.current_view.next());
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.set_view(self.current_view.prev());
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.close_overlay();
        self.current_view = view;
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        match self.current_view {
            View::Nodes => {
                let max = self.visible_nodes().len().saturating_sub(1);
                self.selected_node_index = (self.selected_node_index + n).min(max);
                self.follow_selection();
            }
            View::Applications => {
                let max = self.visible_applications().len().saturating_sub(1);
                self.selected_app_index = (self.selected_app_index + n).min(max);
            }
            View::Insights => {}
        }
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        match self.current_view {
            View::Nodes => {
                self.selected_node_index = self.selected_node_index.saturating_sub(n);
                self.follow_selection();
            }
            View::Applications => {
                self.selected_app_index = self.selected_app_index.saturating_sub(n);
            }
            View::Insights => {}
        }
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        self.select_prev_n(usize::MAX);
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        self.select_next_n(usize::MAX / 2);
    }

    // Keep the node overlay in step with the selection
    fn follow_selection(&mut self) {
        if let Some(node_id) = self.open_node_detail() {
            let current = self.dashboard.node_detail.as_ref().map(|d| d.node_id.as_str());
            if current != Some(node_id.as_str()) {
                let range = self.dashboard.range.clone();
                self.issue(Request::NodeDetail { node_id, range });
            }
        }
    }

    /// Open the detail overlay for the current selection.
    pub fn enter_detail(&mut self) {
        match self.current_view {
            View::Nodes => {
                if self.selected_node().is_some() {
                    self.show_detail_overlay = true;
                    self.follow_selection();
                }
            }
            View::Applications => {
                if self.selected_application().is_some() {
                    self.show_detail_overlay = true;
                }
            }
            View::Insights => {}
        }
    }

    /// Navigate back: close overlay first, then go to Nodes.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.close_overlay();
        } else if self.current_view != View::Nodes {
            self.current_view = View::Nodes;
        }
    }

    /// Close the detail overlay if open, dropping any pending node request.
    pub fn close_overlay(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
            self.tracker.cancel(RequestKind::NodeDetail);
            self.fetch_errors.remove(&RequestKind::NodeDetail);
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Cycle to the next sort column of the Nodes view.
    pub fn cycle_sort(&mut self) {
        self.sort_column = self.sort_column.next();
    }

    /// Toggle sort direction between ascending and descending.
    pub fn toggle_sort_direction(&mut self) {
        self.sort_ascending = !self.sort_ascending;
    }

    /// Next metric of the Insights charts.
    pub fn cycle_insight_metric(&mut self) {
        self.insight_metric = self.insight_metric.next();
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the search text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear every filter predicate and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.dashboard.filter.clear();
        self.dashboard.recent_only = false;
        self.filter_active = false;
        self.clamp_selection();
    }

    /// Append a character to the search text.
    pub fn filter_push(&mut self, c: char) {
        self.dashboard.filter.search.push(c);
        self.clamp_selection();
    }

    /// Remove the last character from the search text.
    pub fn filter_pop(&mut self) {
        self.dashboard.filter.search.pop();
        self.clamp_selection();
    }

    /// All → Healthy → Warning → Critical → All.
    pub fn cycle_status_filter(&mut self) {
        self.dashboard.filter.status = self.dashboard.filter.status.next();
        self.clamp_selection();
    }

    pub fn toggle_critical_only(&mut self) {
        self.dashboard.filter.critical_only = !self.dashboard.filter.critical_only;
        self.clamp_selection();
    }

    pub fn toggle_recent_only(&mut self) {
        self.dashboard.recent_only = !self.dashboard.recent_only;
        self.clamp_selection();
    }

    /// Whether any filter narrows the lists.
    pub fn filter_is_active(&self) -> bool {
        self.dashboard.filter.is_active() || self.dashboard.recent_only
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Wait (blocking) until no request is in flight or `timeout` passes.
    ///
    /// For non-interactive use; the TUI polls from its event loop instead.
    pub fn wait_for_responses(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.poll_responses();
            if !self.any_loading() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
    }

    /// Derived summaries and filtered collections, ready to serialize.
    pub fn export_snapshot(&self) -> ExportSnapshot<'_> {
        let applications = self
            .visible_applications()
            .into_iter()
            .map(|application| {
                let (breakdown, findings) = self.application_detail(application);
                ApplicationExport {
                    application,
                    response_band: ResponseBand::of(application.avg_response_time, &self.thresholds)
                        .label(),
                    breakdown,
                    findings,
                }
            })
            .collect();

        ExportSnapshot {
            range_token: self.dashboard.range_token,
            range: &self.dashboard.range,
            filter: &self.dashboard.filter,
            recent_only: self.dashboard.recent_only,
            fleet_summary: self.fleet_summary(),
            cluster_stats: self.cluster_stats(),
            nodes: self.visible_nodes(),
            node_summary: self.node_summary(),
            application_summary: self.application_summary(),
            applications,
        }
    }

    /// Export current state to a JSON file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.export_snapshot())?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), "Exported dashboard state");
        Ok(())
    }
}

/// JSON export of the dashboard.
#[derive(Debug, Serialize)]
pub struct ExportSnapshot<'a> {
    pub range_token: RangeToken,
    pub range: &'a TimeRange,
    pub filter: &'a FilterCriteria,
    pub recent_only: bool,
    pub fleet_summary: FleetSummary,
    pub cluster_stats: Option<ClusterStats>,
    pub nodes: Vec<&'a FleetNode>,
    pub node_summary: NodeSummary,
    pub application_summary: ApplicationSummary,
    pub applications: Vec<ApplicationExport<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationExport<'a> {
    #[serde(flatten)]
    pub application: &'a ApplicationMetric,
    pub response_band: &'static str,
    pub breakdown: Vec<NodeAppDetail>,
    pub findings: Findings,
}
