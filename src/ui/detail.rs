//! Detail overlay rendering.
//!
//! Nodes get their performance series; applications get the per-node
//! breakdown and findings.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Sparkline, Table, Wrap},
    Frame,
};

use crate::app::{App, View};
use crate::data::series::values;
use crate::data::{
    detect_trend, ApplicationMetric, ChartPoint, Finding, FleetNode, HealthStatus, NodeAppDetail,
    ResponseBand,
};
use crate::source::RequestKind;
use crate::ui::common::format_count;

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 16;

/// Render the detail overlay of the current view's selection.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    match app.current_view {
        View::Nodes => {
            if let Some(node) = app.selected_node() {
                let overlay = overlay_area(area);
                frame.render_widget(Clear, overlay);
                render_node(frame, app, node, overlay);
            }
        }
        View::Applications => {
            if let Some(application) = app.selected_application() {
                let overlay = overlay_area(area);
                frame.render_widget(Clear, overlay);
                render_application(frame, app, application, overlay);
            }
        }
        View::Insights => {}
    }
}

/// 95% by 90% of the screen, clamped.
fn overlay_area(area: Rect) -> Rect {
    let width = (area.width * 95 / 100).clamp(MIN_OVERLAY_WIDTH, 120);
    let height = (area.height * 90 / 100).clamp(MIN_OVERLAY_HEIGHT, 50);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn bordered(app: &App, title: String) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

fn bold(text: String) -> Span<'static> {
    Span::styled(text, Style::default().add_modifier(Modifier::BOLD))
}

fn dim(text: &'static str) -> Line<'static> {
    Line::from(Span::styled(text, Style::default().add_modifier(Modifier::DIM)))
}

fn footer(frame: &mut Frame, area: Rect) {
    frame.render_widget(Paragraph::new(dim(" Press Esc to close ")), area);
}

fn render_node(frame: &mut Frame, app: &App, node: &FleetNode, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(6),
        Constraint::Min(8),
        Constraint::Length(1),
    ])
    .split(area);

    let mut header = vec![
        Line::from(vec![
            bold(format!(" {} ", node.node_name)),
            Span::styled(
                format!("{} {}", node.status.symbol(), node.status.label()),
                app.theme.status_style(node.status).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  {} / {}", node.node_id, node.system_id)),
        ]),
        Line::from(format!(
            " State: {}   Participation: {}   AMB: {}   Heartbeat: {}",
            or_dash(&node.state),
            or_dash(&node.participation),
            or_dash(&node.amb_status),
            or_dash(&node.last_heartbeat)
        )),
    ];
    if !node.reasons.is_empty() {
        header.push(Line::from(Span::styled(
            format!(" Reasons: {}", node.reasons.join("; ")),
            app.theme.status_style(node.status),
        )));
    }

    let snapshot = app
        .dashboard
        .node_detail
        .as_ref()
        .filter(|d| d.node_id == node.node_id);
    if let Some(detail) = snapshot {
        let p = &detail.performance;
        header.push(Line::from(vec![
            Span::raw(" Transactions: "),
            bold(format_count(p.total_transactions.max(0.0) as u64)),
            Span::raw("   DB queries: "),
            bold(format_count(p.total_db_queries.max(0.0) as u64)),
            Span::raw("   Avg txn: "),
            bold(format!("{:.0}ms", p.avg_transaction_time_ms)),
            Span::raw("   Avg DB: "),
            bold(format!("{:.0}ms", p.avg_db_time_ms)),
        ]));
    }

    frame.render_widget(
        Paragraph::new(header).block(
            bordered(app, format!(" Node Detail ({}) ", app.dashboard.range_token))
                .border_style(Style::default().fg(app.theme.highlight)),
        ),
        chunks[0],
    );

    match snapshot {
        Some(detail) => render_series_grid(frame, app, &detail.performance.series(), chunks[1]),
        None => {
            let text = if app.is_loading(RequestKind::NodeDetail) {
                dim("  Loading node details...")
            } else if let Some(err) = app.fetch_error(RequestKind::NodeDetail) {
                Line::from(Span::styled(
                    format!("  {}", err),
                    app.theme.status_style(HealthStatus::Critical),
                ))
            } else {
                dim("  No details for this node.")
            };
            frame.render_widget(Paragraph::new(text).block(bordered(app, " Performance ".into())), chunks[1]);
        }
    }

    footer(frame, chunks[2]);
}

fn or_dash(text: &str) -> &str {
    if text.is_empty() {
        "-"
    } else {
        text
    }
}

/// Sparkline heights; negative values are drawn as zero.
pub fn sparkline_data(points: &[ChartPoint]) -> Vec<u64> {
    points.iter().map(|p| p.value.max(0.0).round() as u64).collect()
}

fn render_series_grid(frame: &mut Frame, app: &App, series: &[(&str, &[ChartPoint])], area: Rect) {
    let rows = Layout::vertical(vec![Constraint::Ratio(1, 4); 4]).split(area);
    let cells: Vec<Rect> = rows
        .iter()
        .flat_map(|row| Layout::horizontal([Constraint::Ratio(1, 2); 2]).split(*row).to_vec())
        .collect();

    for (i, ((title, points), cell)) in series.iter().zip(cells).enumerate() {
        let vals = values(points);
        let trend = detect_trend(&vals);
        let latest = vals.last().copied().unwrap_or(0.0);
        let title = format!(" {} {:.0} {} ", title, latest, trend.symbol());
        let data = sparkline_data(points);
        let sparkline = Sparkline::default()
            .block(bordered(app, title))
            .data(&data)
            .style(Style::default().fg(app.theme.series_color(i)));
        frame.render_widget(sparkline, cell);
    }
}

fn render_application(frame: &mut Frame, app: &App, application: &ApplicationMetric, area: Rect) {
    let (breakdown, findings) = app.application_detail(application);
    let band = ResponseBand::of(application.avg_response_time, &app.thresholds);

    let chunks = Layout::vertical([
        Constraint::Length(7),
        Constraint::Length((breakdown.len() as u16 + 3).min(10)),
        Constraint::Min(6),
        Constraint::Length(1),
    ])
    .split(area);

    let slow_urls = if application.top_slow_urls.is_empty() {
        "-".to_string()
    } else {
        application.top_slow_urls.join(", ")
    };

    let header = vec![
        Line::from(vec![
            bold(format!(" {} ", application.name)),
            Span::styled(
                format!("{} {}", application.status.symbol(), application.status.label()),
                app.theme.status_style(application.status).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::raw(" Hits: "),
            bold(format_count(application.total_hits)),
            Span::raw(format!(" {}   Avg response: ", application.hits_direction().symbol())),
            Span::styled(
                format!("{:.0}ms ({})", application.avg_response_time, band.label()),
                app.theme.band_style(band),
            ),
            Span::raw("   Error rate: "),
            bold(format!("{:.1}%", application.error_rate)),
        ]),
        Line::from(format!(
            " Time split: DB {:.0}%  Script {:.0}%  Other {:.0}%",
            application.db_time_percent,
            application.script_time_percent,
            application.other_time_percent()
        )),
        Line::from(format!(
            " Most expensive: {}",
            or_dash(&application.most_expensive_transaction)
        )),
        Line::from(format!(" Slow URLs: {}", slow_urls)),
    ];
    frame.render_widget(
        Paragraph::new(header).block(
            bordered(app, " Application Detail ".into())
                .border_style(Style::default().fg(app.theme.highlight)),
        ),
        chunks[0],
    );

    render_breakdown(frame, app, &breakdown, chunks[1]);
    render_findings(frame, app, &findings, chunks[2]);
    footer(frame, chunks[3]);
}

fn render_breakdown(frame: &mut Frame, app: &App, breakdown: &[NodeAppDetail], area: Rect) {
    let header = Row::new(vec!["Node", "CPU %", "Mem %", "Resp ms", "Hits", "Err %", "Status"])
        .style(app.theme.header);
    let rows: Vec<Row> = breakdown
        .iter()
        .map(|d| {
            Row::new(vec![
                Cell::from(d.node_name.clone()),
                Cell::from(format!("{:.0}", d.cpu_percent)),
                Cell::from(format!("{:.0}", d.memory_percent)),
                Cell::from(format!("{:.0}", d.response_time)),
                Cell::from(format_count(d.hits)),
                Cell::from(format!("{:.1}", d.error_rate)),
                Cell::from(d.status.symbol()).style(app.theme.status_style(d.status)),
            ])
        })
        .collect();
    let widths = [
        Constraint::Fill(3),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Min(6),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(bordered(app, format!(" Nodes ({}) ", breakdown.len())));
    frame.render_widget(table, area);
}

fn render_findings(
    frame: &mut Frame,
    app: &App,
    findings: &crate::data::Findings,
    area: Rect,
) {
    let mut lines = Vec::new();
    let mut section = |title: &'static str,
                       status: HealthStatus,
                       list: &[Finding],
                       placeholder: Option<&'static str>| {
        lines.push(Line::from(Span::styled(
            title,
            app.theme.status_style(status).add_modifier(Modifier::BOLD),
        )));
        match placeholder {
            Some(text) => lines.push(Line::from(Span::styled(
                format!("  {}", text),
                Style::default().add_modifier(Modifier::DIM),
            ))),
            None => lines.extend(list.iter().map(|f| {
                Line::from(vec![bold(format!("  {}: ", f.title)), Span::raw(f.detail.clone())])
            })),
        }
    };

    section(
        " Critical Issues",
        HealthStatus::Critical,
        &findings.critical,
        findings.critical_placeholder(),
    );
    section(
        " Warnings",
        HealthStatus::Warning,
        &findings.warnings,
        findings.warnings_placeholder(),
    );
    section(
        " Recommendations",
        HealthStatus::Healthy,
        &findings.recommendations,
        findings.recommendations_placeholder(),
    );

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(bordered(app, " Findings ".into()));
    frame.render_widget(paragraph, area);
}
