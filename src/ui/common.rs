//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::HealthStatus;

/// Render the header bar with fleet health overview.
///
/// Displays: overall status, node counts by server status, throughput and
/// the active time range.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    if app.dashboard.last_updated.is_none() {
        let line = Line::from(vec![
            Span::styled(" NODEWATCH ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("| {} | Loading...", app.dashboard.range_token)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let summary = app.fleet_summary();
    let counts = summary.counts;
    let overall = counts.overall();

    let count_span = |n: usize, status: HealthStatus| {
        if n > 0 {
            Span::styled(n.to_string(), app.theme.status_style(status))
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        }
    };

    let line = Line::from(vec![
        Span::styled(" ● ", app.theme.status_style(overall)),
        Span::styled("NODEWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(counts.healthy.to_string(), Style::default().fg(app.theme.healthy)),
        Span::raw(" ok "),
        count_span(counts.warning, HealthStatus::Warning),
        Span::raw(" warn "),
        count_span(counts.critical, HealthStatus::Critical),
        Span::raw(" crit │ "),
        Span::styled(
            summary.total.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" nodes │ "),
        Span::raw(format!(
            "txns {} avg {}ms db {}ms",
            format_count(summary.total_transactions),
            summary.avg_transaction_time_ms,
            summary.avg_db_time_ms
        )),
        Span::raw(" │ "),
        Span::styled(
            app.dashboard.range_token.to_string(),
            Style::default().fg(app.theme.highlight),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Format a count for display (e.g., 1234 -> "1.2K", 1234567 -> "1.2M").
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Render the tab bar showing available views.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!(" {}:{} ", i + 1, view.label())))
        .collect();

    let selected = View::ALL
        .iter()
        .position(|v| *v == app.current_view)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Title fragment describing the active filter, shared by the list views.
pub fn filter_info(app: &App) -> String {
    let filter = &app.dashboard.filter;
    let mut parts = Vec::new();
    if app.filter_active {
        parts.push(format!("/{}_", filter.search));
    } else if !filter.search.is_empty() {
        parts.push(format!("/{}/", filter.search));
    }
    if filter.critical_only {
        parts.push("critical".to_string());
    } else if app.dashboard.filter.status != crate::data::StatusFilter::All {
        parts.push(format!("status:{}", filter.status.label()));
    }
    if app.dashboard.recent_only {
        parts.push(format!("seen<{}", app.dashboard.range_token));
    }

    if parts.is_empty() {
        String::new()
    } else {
        format!(" {} [c:clear]", parts.join(" "))
    }
}

/// Render the status bar at the bottom.
///
/// Shows: breadcrumb trail, loading state, time since last update, the last
/// fetch error and available controls.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    if let Some(err) = app.load_error() {
        let paragraph = Paragraph::new(format!(" Error: {} | r:retry q:quit", err))
            .style(app.theme.status_style(HealthStatus::Critical));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = if app.filter_active {
        "Type to search | Enter:apply Esc:cancel"
    } else {
        match app.current_view {
            View::Nodes => "/:search f:status x:crit b:seen s:sort t:range Enter:detail ?:help q:quit",
            View::Applications => "/:search f:status x:crit t:range Enter:detail ?:help q:quit",
            View::Insights => "m:metric t:range Tab:switch ?:help q:quit",
        }
    };

    let freshness = if app.any_loading() {
        "Loading...".to_string()
    } else if let Some(at) = app.dashboard.last_updated {
        format!("Updated {:.1}s ago", at.elapsed().as_secs_f64())
    } else {
        "No data".to_string()
    };

    let status = format!(
        " {} | {} | {} | {}",
        app.breadcrumb(),
        app.source_description(),
        freshness,
        controls
    );

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  1/2/3 Tab   Switch views"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       View detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        section(" Filters"),
        Line::from("  /         Search by name"),
        Line::from("  f         Cycle status filter"),
        Line::from("  x         Critical only"),
        Line::from("  b         Heartbeat within range"),
        Line::from("  c         Clear filters"),
        Line::from(""),
        section(" Nodes & Insights"),
        Line::from("  s / S     Sort column / direction"),
        Line::from("  m         Cycle insight metric"),
        Line::from(""),
        section(" General"),
        Line::from("  t         Cycle time range"),
        Line::from("  r         Refresh now"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 44u16.min(area.width.saturating_sub(4));
    let help_height = 31u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
