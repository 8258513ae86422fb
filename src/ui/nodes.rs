//! Nodes view rendering.
//!
//! One row per node of the cluster overview, classified by the server, with
//! a transaction sparkline built from the refresh history.

use std::cmp::Ordering;

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::FleetNode;
use crate::source::RequestKind;
use crate::ui::common::{filter_info, format_count};

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Column to sort by in the Nodes view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    Name,
    Status,
    Transactions,
    /// Average transaction time.
    Latency,
    DbTime,
    /// Most recent heartbeat.
    Heartbeat,
}

impl SortColumn {
    /// Cycle to the next sort column.
    pub fn next(self) -> Self {
        match self {
            SortColumn::Name => SortColumn::Status,
            SortColumn::Status => SortColumn::Transactions,
            SortColumn::Transactions => SortColumn::Latency,
            SortColumn::Latency => SortColumn::DbTime,
            SortColumn::DbTime => SortColumn::Heartbeat,
            SortColumn::Heartbeat => SortColumn::Name,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortColumn::Name => "name",
            SortColumn::Status => "status",
            SortColumn::Transactions => "txns",
            SortColumn::Latency => "latency",
            SortColumn::DbTime => "db",
            SortColumn::Heartbeat => "heartbeat",
        }
    }
}

/// Render the Nodes view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if app.dashboard.last_updated.is_none() {
        let text = if app.fetch_error(RequestKind::Overview).is_some() {
            "  No cluster data. Press r to retry."
        } else {
            "  Loading cluster overview..."
        };
        let empty = Paragraph::new(Span::styled(text, Style::default().add_modifier(Modifier::DIM)))
            .block(block.title(" Nodes "));
        frame.render_widget(empty, area);
        return;
    }

    let nodes = app.visible_nodes();

    let header = Row::new(vec![
        Cell::from(format_header("Node", SortColumn::Name, app)),
        Cell::from(format_header("Status", SortColumn::Status, app)),
        Cell::from("State"),
        Cell::from(format_header("Txns", SortColumn::Transactions, app)),
        Cell::from("Trend"),
        Cell::from(format_header("Avg ms", SortColumn::Latency, app)),
        Cell::from(format_header("DB ms", SortColumn::DbTime, app)),
        Cell::from("Queue ms"),
        Cell::from("Slow %"),
        Cell::from(format_header("Heartbeat", SortColumn::Heartbeat, app)),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = nodes
        .iter()
        .map(|n| {
            let trend = app.history.transactions_trend(&n.node_id);
            Row::new(vec![
                Cell::from(n.node_name.clone()),
                Cell::from(n.status.symbol()).style(app.theme.status_style(n.status)),
                Cell::from(n.state.clone()),
                Cell::from(format_count(n.total_transactions)),
                Cell::from(Span::styled(
                    format!(
                        "{}{}",
                        render_sparkline(&app.history.transactions_sparkline(&n.node_id)),
                        trend.symbol()
                    ),
                    app.theme.trend_style(trend),
                )),
                Cell::from(format!("{:.0}", n.avg_transaction_time_ms)),
                Cell::from(format!("{:.0}", n.avg_db_time_ms)),
                Cell::from(format!("{:.0}", n.avg_queue_length_ms)),
                Cell::from(format!("{:.1}", n.slow_transaction_percent)),
                Cell::from(if n.last_heartbeat.is_empty() {
                    "-".to_string()
                } else {
                    n.last_heartbeat.clone()
                }),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3),
        Constraint::Min(6),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Min(9),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Min(19),
    ];

    let selected = app.selected_node_index.min(nodes.len().saturating_sub(1));
    let sort_dir = if app.sort_ascending { "↑" } else { "↓" };
    let position_info = if !nodes.is_empty() {
        format!(" [{}/{}]", selected + 1, nodes.len())
    } else {
        String::new()
    };

    let title = format!(
        " Nodes ({}/{}) [s:sort {}{}]{}{} ",
        nodes.len(),
        app.dashboard.fleet.len(),
        app.sort_column.label(),
        sort_dir,
        filter_info(app),
        position_info
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(block.title(title))
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}

fn format_header(name: &str, col: SortColumn, app: &App) -> Span<'static> {
    if app.sort_column == col {
        let arrow = if app.sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}

/// Sort nodes by the given column and direction, ties broken by name.
pub fn sort_nodes_by(nodes: &mut [&FleetNode], column: SortColumn, ascending: bool) {
    nodes.sort_by(|a, b| {
        let primary = match column {
            SortColumn::Name => a.node_name.cmp(&b.node_name),
            SortColumn::Status => a.status.cmp(&b.status),
            SortColumn::Transactions => a.total_transactions.cmp(&b.total_transactions),
            SortColumn::Latency => a.avg_transaction_time_ms.total_cmp(&b.avg_transaction_time_ms),
            SortColumn::DbTime => a.avg_db_time_ms.total_cmp(&b.avg_db_time_ms),
            // wire format sorts lexically
            SortColumn::Heartbeat => a.last_heartbeat.cmp(&b.last_heartbeat),
        };

        let primary = if ascending {
            primary
        } else {
            primary.reverse()
        };

        if primary == Ordering::Equal {
            a.node_name.cmp(&b.node_name)
        } else {
            primary
        }
    });
}

fn render_sparkline(data: &[u8]) -> String {
    if data.is_empty() {
        return "        ".to_string();
    }

    // Take last 8 values
    let values: Vec<u8> = data.iter().rev().take(8).rev().copied().collect();

    values.iter().map(|&v| SPARKLINE_CHARS[v.min(7) as usize]).collect()
}
