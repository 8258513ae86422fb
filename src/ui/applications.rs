//! Applications view rendering.
//!
//! Summary cards over the inventory, the application table and the
//! inventory nodes with their alert flags.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::summary::error_rate_above_target;
use crate::data::{HealthStatus, ResponseBand, StatusCounts};
use crate::ui::common::{filter_info, format_count};

/// Render the Applications view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if app.dashboard.inventory.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  No inventory loaded. Start with --inventory <file> or set dashboard.inventory.",
                Style::default().add_modifier(Modifier::DIM),
            )),
        ])
        .block(bordered(app, " Applications "));
        frame.render_widget(empty, area);
        return;
    }

    let node_rows = app.dashboard.inventory.nodes.len() as u16;
    let chunks = Layout::vertical([
        Constraint::Length(4),
        Constraint::Min(6),
        Constraint::Length((node_rows + 3).min(10)),
    ])
    .split(area);

    render_cards(frame, app, chunks[0]);
    render_applications(frame, app, chunks[1]);
    render_inventory_nodes(frame, app, chunks[2]);
}

fn bordered(app: &App, title: impl Into<String>) -> Block<'static> {
    Block::default()
        .title(title.into())
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

fn counts_spans(app: &App, counts: &StatusCounts) -> Vec<Span<'static>> {
    vec![
        Span::styled(
            format!("{} ok ", counts.healthy),
            app.theme.status_style(HealthStatus::Healthy),
        ),
        Span::styled(
            format!("{} warn ", counts.warning),
            app.theme.status_style(HealthStatus::Warning),
        ),
        Span::styled(
            format!("{} crit", counts.critical),
            app.theme.status_style(HealthStatus::Critical),
        ),
    ]
}

fn render_cards(frame: &mut Frame, app: &App, area: Rect) {
    let nodes = app.node_summary();
    let apps = app.application_summary();
    let band = ResponseBand::of(apps.avg_response_time, &app.thresholds);
    let errors_high = error_rate_above_target(apps.avg_error_rate, &app.thresholds);

    let mut node_line = vec![Span::styled(
        format!(" Nodes {:>3}  ", nodes.total),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    node_line.extend(counts_spans(app, &nodes.counts));
    node_line.push(Span::raw(format!(
        " │ cpu {:.1}% mem {:.1}% db {:.0}ms │ txns {} amb {:.0} │ max queue {}",
        nodes.avg_cpu,
        nodes.avg_memory,
        nodes.avg_db_time,
        format_count(nodes.total_transactions),
        nodes.total_amb_rate,
        nodes.max_queue_depth
    )));

    let mut app_line = vec![Span::styled(
        format!(" Apps  {:>3}  ", apps.total),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    app_line.extend(counts_spans(app, &apps.counts));
    app_line.extend([
        Span::raw(format!(" │ hits {} │ avg ", format_count(apps.total_hits))),
        Span::styled(
            format!("{:.0}ms {}", apps.avg_response_time, band.label()),
            app.theme.band_style(band),
        ),
        Span::raw(" │ errors "),
        Span::styled(
            format!("{:.1}%", apps.avg_error_rate),
            if errors_high {
                app.theme.status_style(HealthStatus::Warning)
            } else {
                app.theme.status_style(HealthStatus::Healthy)
            },
        ),
        Span::raw(format!(" │ {} slow", apps.slow_count)),
    ]);

    let cards = Paragraph::new(vec![Line::from(node_line), Line::from(app_line)])
        .block(bordered(app, " Inventory "));
    frame.render_widget(cards, area);
}

fn render_applications(frame: &mut Frame, app: &App, area: Rect) {
    let apps = app.visible_applications();

    let header = Row::new(vec![
        "Application", "Status", "Hits", "Trend", "Avg ms", "Band", "Err %", "DB %", "Nodes",
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = apps
        .iter()
        .map(|a| {
            let band = ResponseBand::of(a.avg_response_time, &app.thresholds);
            let trend = a.hits_direction();
            Row::new(vec![
                Cell::from(a.name.clone()),
                Cell::from(a.status.symbol()).style(app.theme.status_style(a.status)),
                Cell::from(format_count(a.total_hits)),
                Cell::from(trend.symbol()).style(app.theme.trend_style(trend)),
                Cell::from(format!("{:.0}", a.avg_response_time)),
                Cell::from(band.label()).style(app.theme.band_style(band)),
                Cell::from(format!("{:.1}", a.error_rate)),
                Cell::from(format!("{:.0}", a.db_time_percent)),
                Cell::from(a.nodes.len().to_string()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3),
        Constraint::Min(6),
        Constraint::Fill(1),
        Constraint::Min(5),
        Constraint::Fill(1),
        Constraint::Min(9),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Min(5),
    ];

    let selected = app.selected_app_index.min(apps.len().saturating_sub(1));
    let position_info = if !apps.is_empty() {
        format!(" [{}/{}]", selected + 1, apps.len())
    } else {
        String::new()
    };
    let title = format!(
        " Applications ({}/{}){}{} ",
        apps.len(),
        app.dashboard.inventory.applications.len(),
        filter_info(app),
        position_info
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(bordered(app, title))
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_inventory_nodes(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec![
        "Node", "Status", "CPU %", "Mem %", "Txns", "DB ms", "AMB", "Queue", "Slow", "Apps", "Alert",
    ])
    .style(app.theme.header);

    let rows: Vec<Row> = app
        .dashboard
        .inventory
        .nodes
        .iter()
        .map(|n| {
            let txn_trend = n.transaction_direction();
            let db_trend = n.db_response_direction();
            let alert = n.alert_label(&app.thresholds);
            Row::new(vec![
                Cell::from(n.name.clone()),
                Cell::from(n.status.symbol()).style(app.theme.status_style(n.status)),
                Cell::from(format!("{:.0}", n.cpu_percent)),
                Cell::from(format!("{:.0}", n.jvm_memory_percent)),
                Cell::from(Span::styled(
                    format!("{} {}", n.active_transactions, txn_trend.symbol()),
                    app.theme.trend_style(txn_trend),
                )),
                Cell::from(Span::styled(
                    format!("{:.0} {}", n.db_response_time, db_trend.symbol()),
                    app.theme.trend_style(db_trend),
                )),
                Cell::from(format!("{:.0} {}", n.amb_rate, n.amb_trend.symbol())),
                Cell::from(n.thread_queue_depth.to_string()),
                Cell::from(n.slow_pattern_count.to_string()),
                Cell::from(app.dashboard.inventory.hosted_by(n).len().to_string()),
                Cell::from(alert.unwrap_or("")).style(app.theme.status_style(HealthStatus::Warning)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Min(6),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(2),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(bordered(app, " Inventory nodes "));
    frame.render_widget(table, area);
}
