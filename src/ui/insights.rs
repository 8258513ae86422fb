//! Insights view rendering.
//!
//! Server stats card plus a comparative line chart of one metric across
//! every node, cycled with `m`.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::series::values;
use crate::data::{detect_trend, pivot_insights, InsightMetric, NodeSeries};
use crate::source::RequestKind;
use crate::ui::common::format_count;

/// Render the Insights view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(insights) = app.dashboard.insights.as_ref() else {
        let text = if app.fetch_error(RequestKind::Insights).is_some() {
            "  No insights. Press r to retry."
        } else {
            "  Loading cluster insights..."
        };
        let empty = Paragraph::new(Span::styled(text, Style::default().add_modifier(Modifier::DIM)))
            .block(block(app, " Insights ".to_string()));
        frame.render_widget(empty, area);
        return;
    };

    let series = pivot_insights(insights, app.insight_metric);
    let legend_height = (series.len() as u16 + 3).min(12);

    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(8),
        Constraint::Length(legend_height),
    ])
    .split(area);

    render_stats(frame, app, chunks[0]);
    render_chart(frame, app, &series, chunks[1]);
    render_legend(frame, app, &series, chunks[2]);
}

fn block(app: &App, title: String) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

fn render_stats(frame: &mut Frame, app: &App, area: Rect) {
    let Some(stats) = app.cluster_stats() else {
        return;
    };
    let line = Line::from(vec![
        Span::raw(format!(" cpu {:.1}%", stats.avg_cpu)),
        Span::raw(format!(" │ mem {:.1}%", stats.avg_memory)),
        Span::raw(format!(" │ db {:.0}ms", stats.avg_db_time_ms)),
        Span::raw(format!(" │ amb {}", format_count(stats.total_amb.max(0.0) as u64))),
        Span::raw(format!(
            " │ txns {}",
            format_count(stats.total_transactions.max(0.0) as u64)
        )),
        Span::raw(format!(" │ max queue {:.0}", stats.max_queue)),
    ]);
    frame.render_widget(
        Paragraph::new(line).block(block(app, " Cluster ".to_string())),
        area,
    );
}

/// Y axis upper bound with some headroom; never zero.
pub fn y_bound(series: &[NodeSeries]) -> f64 {
    let max = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.value))
        .fold(0.0_f64, f64::max);
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

fn render_chart(frame: &mut Frame, app: &App, series: &[NodeSeries], area: Rect) {
    let title = format!(
        " {} [m:{}] ",
        app.insight_metric.title(),
        next_metric_hint(app.insight_metric)
    );

    let data: Vec<Vec<(f64, f64)>> = series
        .iter()
        .map(|s| {
            s.points
                .iter()
                .enumerate()
                .map(|(i, p)| (i as f64, p.value))
                .collect()
        })
        .collect();

    let datasets: Vec<Dataset> = series
        .iter()
        .zip(&data)
        .enumerate()
        .map(|(i, (s, points))| {
            Dataset::default()
                .name(s.node_name.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(app.theme.series_color(i)))
                .data(points)
        })
        .collect();

    let buckets = series.first().map(|s| s.points.len()).unwrap_or(0);
    let x_labels: Vec<Span> = series
        .first()
        .map(|s| {
            let first = s.points.first().map(|p| p.time.clone()).unwrap_or_default();
            let last = s.points.last().map(|p| p.time.clone()).unwrap_or_default();
            vec![Span::raw(first), Span::raw(last)]
        })
        .unwrap_or_default();

    let top = y_bound(series);
    let chart = Chart::new(datasets)
        .block(block(app, title))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds([0.0, buckets.saturating_sub(1).max(1) as f64])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds([0.0, top])
                .labels(vec![
                    Span::raw("0"),
                    Span::raw(format!("{:.0}", top / 2.0)),
                    Span::raw(format!("{:.0}", top)),
                ]),
        );

    frame.render_widget(chart, area);
}

fn next_metric_hint(metric: InsightMetric) -> &'static str {
    metric.next().suffix()
}

fn render_legend(frame: &mut Frame, app: &App, series: &[NodeSeries], area: Rect) {
    let header = Row::new(vec!["", "Node", "Status", "Latest", "Peak", "Trend"]).style(app.theme.header);

    let rows: Vec<Row> = series
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let vals = values(&s.points);
            let latest = vals.last().copied().unwrap_or(0.0);
            let peak = vals.iter().copied().fold(0.0_f64, f64::max);
            let trend = detect_trend(&vals);
            Row::new(vec![
                Cell::from("━━").style(Style::default().fg(app.theme.series_color(i))),
                Cell::from(s.node_name.clone()),
                Cell::from(s.status.symbol()).style(app.theme.status_style(s.status)),
                Cell::from(format!("{:.1}", latest)),
                Cell::from(format!("{:.1}", peak)),
                Cell::from(trend.symbol()).style(app.theme.trend_style(trend)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Fill(3),
        Constraint::Min(6),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Min(5),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block(app, format!(" Nodes ({}) ", series.len())));
    frame.render_widget(table, area);
}
