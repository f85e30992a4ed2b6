//! Live monitor panels: throughput and thread pools.

use chrono::Local;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use super::format::{format_rate, or_dash, sparkline, table_lines};
use crate::app::App;
use crate::data::duration::format_span;
use crate::data::{Metric, MetricsSummary};

const SPARK_WIDTH: usize = 40;

/// Lines of the live metrics panel.
pub fn live_metrics_lines(app: &App) -> Vec<Line<'static>> {
    let theme = &app.theme;
    let series = &app.metrics;
    let mut lines = vec![updated_line(app, app.metrics_updated_at)];

    if series.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Collecting samples... rates appear after the second poll",
            theme.muted,
        )));
        return lines;
    }

    for (metric, title) in [(Metric::Insert, "Indexing rate"), (Metric::Search, "Search rate")] {
        let summary = series.summary(metric);
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(title, theme.header)));
        lines.push(summary_line(&summary));
        lines.push(Line::from(Span::styled(
            format!("  {}", sparkline(&series.values(metric), SPARK_WIDTH)),
            Style::default().fg(theme.highlight),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(
            "{}/{} data points over {}",
            series.len(),
            series.max_size(),
            format_span(series.time_range())
        ),
        theme.muted,
    )));
    lines
}

fn summary_line(summary: &MetricsSummary) -> Line<'static> {
    Line::from(vec![
        Span::raw("  current "),
        Span::styled(
            format_rate(summary.current),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "   avg {}   peak {}   min {}",
            format_rate(summary.average),
            format_rate(summary.peak),
            format_rate(summary.min)
        )),
    ])
}

/// Lines of the thread pool panel: overall health, per-pool window
/// statistics, then the per-node listing from the last refresh.
pub fn thread_pool_lines(app: &App) -> Vec<Line<'static>> {
    let theme = &app.theme;
    let series = &app.thread_pools;
    let mut lines = vec![updated_line(app, app.thread_pool_updated_at)];

    if series.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Collecting samples...", theme.muted)));
    } else {
        let health = series.health();
        lines.push(Line::from(vec![
            Span::raw("Status: "),
            Span::styled(health.label(), theme.pool_health_style(health)),
        ]));
        lines.push(Line::from(""));

        let rows = series
            .summary()
            .into_iter()
            .map(|(name, s)| {
                let style = if s.current_rejections > 0.0 {
                    Style::default().fg(theme.critical)
                } else {
                    Style::default()
                };
                let cells = vec![
                    name.clone(),
                    format!("{:.0}", s.current_queue),
                    format!("{:.1}", s.average_queue),
                    format!("{:.0}", s.peak_queue),
                    format_rate(s.current_rejections),
                    format_rate(s.peak_rejections),
                    sparkline(&series.queue_values(&name), 16),
                ];
                (cells, style)
            })
            .collect();
        lines.extend(table_lines(
            theme.header,
            &["pool", "queue", "avg", "peak", "rejected", "peak rej", "queue trend"],
            rows,
        ));
    }

    if let Some(ref data) = app.data {
        if !data.thread_pools.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Per node", theme.header)));
            let rows = data
                .thread_pools
                .iter()
                .map(|p| {
                    let cells = [
                        &p.node_name,
                        &p.name,
                        &p.active,
                        &p.queue,
                        &p.rejected,
                        &p.completed,
                        &p.size,
                    ]
                    .into_iter()
                    .map(|v| or_dash(v).to_string())
                    .collect();
                    (cells, Style::default())
                })
                .collect();
            lines.extend(table_lines(
                theme.header,
                &["node", "pool", "active", "queue", "rejected", "completed", "size"],
                rows,
            ));
        }
    }

    lines
}

fn updated_line(app: &App, at: Option<chrono::DateTime<chrono::Utc>>) -> Line<'static> {
    let text = match at {
        Some(t) => format!("Updated {}", t.with_timezone(&Local).format("%H:%M:%S")),
        None => "Waiting for first sample".to_string(),
    };
    Line::from(Span::styled(text, app.theme.muted))
}
