//! The right panel: one renderer per view.
//!
//! Every view except Indices is a list of lines scrolled by `app.scroll`.
//! Indices is a table whose selected row follows the index cursor.

use ostop_client::{FieldInfo, IndexMapping};
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use super::common::render_error;
use super::format::{format_bytes, format_count, or_dash, percent_bar, table_lines};
use super::monitor::{live_metrics_lines, thread_pool_lines};
use super::Viewport;
use crate::app::{App, Panel, View};
use crate::fetch::ClusterData;

/// Render the content panel and report its scroll extent.
pub fn render(frame: &mut Frame, app: &App, area: Rect) -> Viewport {
    let title = match (&app.current_view, &app.selected_index_name) {
        (View::IndexSchema, Some(name)) => format!(" Index Schema: {} ", name),
        (view, _) => format!(" {} ", view.label()),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(app.theme.panel_border(app.active_panel == Panel::Right));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(ref error) = app.error {
        render_error(frame, app, &error.to_string(), inner);
        return Viewport::default();
    }

    if app.current_view == View::Indices {
        if let Some(ref data) = app.data {
            return render_indices(frame, app, data, inner);
        }
    }

    let lines = match view_lines(app) {
        Some(lines) => lines,
        None => vec![Line::from(Span::styled("Loading...", app.theme.muted))],
    };
    render_lines(frame, app, lines, inner)
}

fn render_lines(frame: &mut Frame, app: &App, lines: Vec<Line<'static>>, area: Rect) -> Viewport {
    let height = area.height as usize;
    let viewport = Viewport {
        max_scroll: lines.len().saturating_sub(height),
        page_height: height,
    };
    let scroll = scroll_offset(app.scroll.min(viewport.max_scroll));
    let paragraph = Paragraph::new(lines).scroll((scroll, 0));
    frame.render_widget(paragraph, area);
    viewport
}

/// Paragraph offsets are `u16`; saturate instead of wrapping.
fn scroll_offset(scroll: usize) -> u16 {
    u16::try_from(scroll).unwrap_or(u16::MAX)
}

/// Lines for every line-based view, or `None` while its data is not loaded.
pub fn view_lines(app: &App) -> Option<Vec<Line<'static>>> {
    match app.current_view {
        View::LiveMetrics => return Some(live_metrics_lines(app)),
        View::ThreadPoolMonitor => return Some(thread_pool_lines(app)),
        View::IndexSchema => return schema_lines(app),
        _ => {}
    }

    let data = app.data.as_ref()?;
    let lines = match app.current_view {
        View::ClusterOverview => overview_lines(app, data),
        View::Nodes => nodes_lines(app, data),
        View::Indices => indices_lines(app, data),
        View::Shards => shards_lines(app, data),
        View::Resources => resources_lines(app, data),
        View::Allocation => allocation_lines(app, data),
        View::Tasks => tasks_lines(app, data),
        View::PendingTasks => pending_tasks_lines(app, data),
        View::Recovery => recovery_lines(app, data),
        View::Segments => segments_lines(app, data),
        View::Fielddata => fielddata_lines(app, data),
        View::Plugins => plugins_lines(app, data),
        View::Templates => templates_lines(app, data),
        View::LiveMetrics | View::ThreadPoolMonitor | View::IndexSchema => Vec::new(),
    };
    Some(lines)
}

fn empty(app: &App, message: &'static str) -> Vec<Line<'static>> {
    vec![Line::from(Span::styled(message, app.theme.muted))]
}

fn cells<const N: usize>(values: [&str; N]) -> Vec<String> {
    values.iter().map(|v| or_dash(v).to_string()).collect()
}

fn label_value(label: &str, value: impl Into<String>, style: Style) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!("  {:<22}", label)),
        Span::styled(value.into(), style),
    ])
}

fn overview_lines(app: &App, data: &ClusterData) -> Vec<Line<'static>> {
    let health = &data.health;
    let stats = &data.stats;
    let theme = &app.theme;
    let plain = Style::default();

    vec![
        Line::from(Span::styled("Cluster", theme.header)),
        label_value("Name", health.cluster_name.clone(), plain),
        label_value(
            "Status",
            health.status.to_uppercase(),
            theme.cluster_status_style(&health.status),
        ),
        label_value("Timed out", health.timed_out.to_string(), plain),
        Line::from(""),
        Line::from(Span::styled("Nodes", theme.header)),
        label_value("Total", health.number_of_nodes.to_string(), plain),
        label_value("Data", health.number_of_data_nodes.to_string(), plain),
        Line::from(""),
        Line::from(Span::styled("Shards", theme.header)),
        label_value("Active primary", health.active_primary_shards.to_string(), plain),
        label_value("Active", health.active_shards.to_string(), plain),
        label_value("Relocating", health.relocating_shards.to_string(), plain),
        label_value("Initializing", health.initializing_shards.to_string(), plain),
        label_value(
            "Unassigned",
            health.unassigned_shards.to_string(),
            if health.unassigned_shards > 0 {
                Style::default().fg(theme.warning)
            } else {
                plain
            },
        ),
        Line::from(""),
        Line::from(Span::styled("Data", theme.header)),
        label_value("Indices", stats.indices.count.to_string(), plain),
        label_value("Documents", format_count(stats.indices.docs.count), plain),
        label_value("Store size", format_bytes(stats.indices.store.size_in_bytes), plain),
    ]
}

fn nodes_lines(app: &App, data: &ClusterData) -> Vec<Line<'static>> {
    if data.nodes.is_empty() {
        return empty(app, "No nodes reported");
    }
    let rows = data
        .nodes
        .iter()
        .map(|n| {
            let master = if n.is_master() { "*" } else { "" };
            let style = if n.is_master() {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let row = cells([
                &n.name,
                &n.ip,
                &n.node_role,
                master,
                &n.heap_percent,
                &n.ram_percent,
                &n.cpu,
                &n.load_1m,
                &n.load_5m,
                &n.load_15m,
            ]);
            (row, style)
        })
        .collect();
    table_lines(
        app.theme.header,
        &["name", "ip", "role", "master", "heap%", "ram%", "cpu%", "load1", "load5", "load15"],
        rows,
    )
}

/// Plain listing of the indices. The panel itself draws the cursor table
/// from [`render_indices`].
fn indices_lines(app: &App, data: &ClusterData) -> Vec<Line<'static>> {
    if data.indices.is_empty() {
        return empty(app, "No indices");
    }
    let rows = data
        .indices
        .iter()
        .map(|i| {
            let row = cells([&i.index, &i.health, &i.status, &i.docs_count, &i.store_size]);
            (row, app.theme.cluster_status_style(&i.health))
        })
        .collect();
    table_lines(app.theme.header, &["index", "health", "status", "docs", "size"], rows)
}

fn render_indices(frame: &mut Frame, app: &App, data: &ClusterData, area: Rect) -> Viewport {
    if data.indices.is_empty() {
        return render_lines(frame, app, empty(app, "No indices"), area);
    }

    let header = Row::new(
        ["Index", "Health", "Status", "Pri", "Rep", "Docs", "Deleted", "Size", "Pri size"]
            .map(Cell::from),
    )
    .style(app.theme.header);

    let rows: Vec<Row> = data
        .indices
        .iter()
        .map(|i| {
            Row::new(vec![
                Cell::from(i.index.clone()),
                Cell::from(or_dash(&i.health).to_string())
                    .style(app.theme.cluster_status_style(&i.health)),
                Cell::from(or_dash(&i.status).to_string()),
                Cell::from(or_dash(&i.pri).to_string()),
                Cell::from(or_dash(&i.rep).to_string()),
                Cell::from(or_dash(&i.docs_count).to_string()),
                Cell::from(or_dash(&i.docs_deleted).to_string()),
                Cell::from(or_dash(&i.store_size).to_string()),
                Cell::from(or_dash(&i.pri_store_size).to_string()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Min(20),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(11),
        Constraint::Length(8),
        Constraint::Length(9),
        Constraint::Length(9),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default().with_selected(Some(app.selected_index_entry));
    frame.render_stateful_widget(table, area, &mut state);

    Viewport {
        max_scroll: 0,
        page_height: (area.height as usize).saturating_sub(1),
    }
}

fn shards_lines(app: &App, data: &ClusterData) -> Vec<Line<'static>> {
    if data.shards.is_empty() {
        return empty(app, "No shards");
    }
    let theme = &app.theme;
    let rows = data
        .shards
        .iter()
        .map(|s| {
            let style = match s.state.as_str() {
                "UNASSIGNED" => Style::default().fg(theme.critical),
                "INITIALIZING" | "RELOCATING" => Style::default().fg(theme.warning),
                _ => Style::default(),
            };
            let row = cells([&s.index, &s.shard, &s.prirep, &s.state, &s.docs, &s.store, &s.ip, &s.node]);
            (row, style)
        })
        .collect();
    table_lines(
        theme.header,
        &["index", "shard", "p/r", "state", "docs", "store", "ip", "node"],
        rows,
    )
}

fn resources_lines(app: &App, data: &ClusterData) -> Vec<Line<'static>> {
    if data.nodes.is_empty() {
        return empty(app, "No nodes reported");
    }
    const BAR: usize = 20;
    let mut lines = Vec::new();
    for node in data.nodes.iter() {
        let name = if node.is_master() {
            format!("{} (manager)", node.name)
        } else {
            node.name.clone()
        };
        lines.push(Line::from(vec![
            Span::styled(name, app.theme.header),
            Span::styled(format!("  {}", or_dash(&node.ip)), app.theme.muted),
        ]));
        lines.push(Line::from(format!("  Heap  {}", percent_bar(&node.heap_percent, BAR))));
        lines.push(Line::from(format!("  RAM   {}", percent_bar(&node.ram_percent, BAR))));
        lines.push(Line::from(format!("  CPU   {}", percent_bar(&node.cpu, BAR))));
        lines.push(Line::from(format!(
            "  Disk  {}  {} used / {} free / {} total",
            percent_bar(&node.disk_used_percent, BAR),
            or_dash(&node.disk_used),
            or_dash(&node.disk_avail),
            or_dash(&node.disk_total)
        )));
        lines.push(Line::from(format!(
            "  Load  {} {} {}",
            or_dash(&node.load_1m),
            or_dash(&node.load_5m),
            or_dash(&node.load_15m)
        )));
        lines.push(Line::from(""));
    }
    lines
}

/// Disk usage at which a node is flagged.
const DISK_WARNING: f64 = 75.0;
const DISK_CRITICAL: f64 = 90.0;

/// Allocation per node, fullest disk first.
fn allocation_lines(app: &App, data: &ClusterData) -> Vec<Line<'static>> {
    if data.allocation.is_empty() {
        return empty(app, "No allocation data");
    }
    let theme = &app.theme;
    let percent = |p: &str| p.trim().parse::<f64>().unwrap_or(0.0);

    let mut nodes: Vec<_> = data.allocation.iter().collect();
    nodes.sort_by(|a, b| percent(&b.disk_percent).total_cmp(&percent(&a.disk_percent)));

    let critical = nodes
        .iter()
        .filter(|a| percent(&a.disk_percent) >= DISK_CRITICAL)
        .count();
    let warning = nodes
        .iter()
        .filter(|a| (DISK_WARNING..DISK_CRITICAL).contains(&percent(&a.disk_percent)))
        .count();

    let mut lines = Vec::new();
    if critical > 0 {
        lines.push(Line::from(Span::styled(
            format!("⚠ {} node(s) at ≥{:.0}% disk usage", critical, DISK_CRITICAL),
            Style::default().fg(theme.critical).add_modifier(Modifier::BOLD),
        )));
    }
    if warning > 0 {
        lines.push(Line::from(Span::styled(
            format!("{} node(s) at ≥{:.0}% disk usage", warning, DISK_WARNING),
            Style::default().fg(theme.warning),
        )));
    }
    if !lines.is_empty() {
        lines.push(Line::from(""));
    }

    let rows = nodes
        .into_iter()
        .map(|a| {
            let used = percent(&a.disk_percent);
            let style = if used >= DISK_CRITICAL {
                Style::default().fg(theme.critical)
            } else if used >= DISK_WARNING {
                Style::default().fg(theme.warning)
            } else {
                Style::default()
            };
            let row = cells([
                &a.node,
                &a.shards,
                &a.disk_indices,
                &a.disk_used,
                &a.disk_avail,
                &a.disk_total,
                &a.disk_percent,
                &a.host,
            ]);
            (row, style)
        })
        .collect();
    lines.extend(table_lines(
        theme.header,
        &["node", "shards", "indices", "used", "avail", "total", "disk%", "host"],
        rows,
    ));
    lines
}

fn tasks_lines(app: &App, data: &ClusterData) -> Vec<Line<'static>> {
    if data.tasks.is_empty() {
        return empty(app, "No running tasks");
    }
    let rows = data
        .tasks
        .iter()
        .map(|t| {
            let row = cells([&t.action, &t.task_id, &t.kind, &t.running_time, &t.node, &t.description]);
            (row, Style::default())
        })
        .collect();
    table_lines(
        app.theme.header,
        &["action", "task", "type", "running", "node", "description"],
        rows,
    )
}

fn pending_tasks_lines(app: &App, data: &ClusterData) -> Vec<Line<'static>> {
    if data.pending_tasks.is_empty() {
        return empty(app, "No pending cluster tasks");
    }
    let rows = data
        .pending_tasks
        .iter()
        .map(|t| {
            let style = match t.priority.as_str() {
                "URGENT" | "IMMEDIATE" => Style::default().fg(app.theme.warning),
                _ => Style::default(),
            };
            (cells([&t.insert_order, &t.time_in_queue, &t.priority, &t.source]), style)
        })
        .collect();
    table_lines(app.theme.header, &["order", "in queue", "priority", "source"], rows)
}

fn recovery_lines(app: &App, data: &ClusterData) -> Vec<Line<'static>> {
    if data.recovery.is_empty() {
        return empty(app, "No active recoveries");
    }
    let rows = data
        .recovery
        .iter()
        .map(|r| {
            let style = if r.stage == "done" {
                app.theme.muted
            } else {
                Style::default()
            };
            let row = cells([
                &r.index,
                &r.shard,
                &r.kind,
                &r.stage,
                &r.source_node,
                &r.target_node,
                &r.files_percent,
                &r.bytes_percent,
                &r.time,
            ]);
            (row, style)
        })
        .collect();
    table_lines(
        app.theme.header,
        &["index", "shard", "type", "stage", "source", "target", "files%", "bytes%", "time"],
        rows,
    )
}

fn segments_lines(app: &App, data: &ClusterData) -> Vec<Line<'static>> {
    if data.segments.is_empty() {
        return empty(app, "No segments");
    }
    let rows = data
        .segments
        .iter()
        .map(|s| {
            let row = cells([
                &s.index,
                &s.shard,
                &s.prirep,
                &s.segment,
                &s.generation,
                &s.docs_count,
                &s.docs_deleted,
                &s.size,
                &s.committed,
            ]);
            (row, Style::default())
        })
        .collect();
    table_lines(
        app.theme.header,
        &["index", "shard", "p/r", "segment", "gen", "docs", "deleted", "size", "committed"],
        rows,
    )
}

fn fielddata_lines(app: &App, data: &ClusterData) -> Vec<Line<'static>> {
    if data.fielddata.is_empty() {
        return empty(app, "No fielddata loaded");
    }
    let rows = data
        .fielddata
        .iter()
        .map(|f| (cells([&f.node, &f.field, &f.size, &f.host]), Style::default()))
        .collect();
    table_lines(app.theme.header, &["node", "field", "size", "host"], rows)
}

fn plugins_lines(app: &App, data: &ClusterData) -> Vec<Line<'static>> {
    if data.plugins.is_empty() {
        return empty(app, "No plugins installed");
    }
    let rows = data
        .plugins
        .iter()
        .map(|p| (cells([&p.name, &p.component, &p.version]), Style::default()))
        .collect();
    table_lines(app.theme.header, &["node", "component", "version"], rows)
}

fn templates_lines(app: &App, data: &ClusterData) -> Vec<Line<'static>> {
    if data.templates.is_empty() {
        return empty(app, "No index templates");
    }
    let rows = data
        .templates
        .iter()
        .map(|t| (cells([&t.name, &t.index_patterns, &t.order, &t.version]), Style::default()))
        .collect();
    table_lines(app.theme.header, &["name", "patterns", "order", "version"], rows)
}

fn schema_lines(app: &App) -> Option<Vec<Line<'static>>> {
    let mapping = match app.index_mapping {
        Some(ref mapping) => mapping,
        None if app.mapping_in_flight() => return None,
        None => return Some(empty(app, "No mapping loaded")),
    };
    Some(mapping_lines(app, mapping))
}

fn mapping_lines(app: &App, mapping: &IndexMapping) -> Vec<Line<'static>> {
    let Some(fields) = mapping.fields() else {
        return empty(app, "Index has no field mappings");
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!("{} fields", mapping.field_count()),
            app.theme.muted,
        )),
        Line::from(""),
    ];
    for field in &fields {
        push_field(app, field, 0, &mut lines);
    }
    lines
}

fn push_field(app: &App, field: &FieldInfo, depth: usize, lines: &mut Vec<Line<'static>>) {
    let indent = "  ".repeat(depth);
    let mut spans = vec![
        Span::raw(format!("{}{}", indent, field.name)),
        Span::raw("  "),
        Span::styled(
            or_dash(&field.field_type).to_string(),
            Style::default().fg(app.theme.highlight),
        ),
    ];
    if let Some(ref analyzer) = field.analyzer {
        spans.push(Span::styled(format!("  analyzer={}", analyzer), app.theme.muted));
    }
    if let Some(ref analyzer) = field.search_analyzer {
        spans.push(Span::styled(format!("  search_analyzer={}", analyzer), app.theme.muted));
    }
    if let Some(ref normalizer) = field.normalizer {
        spans.push(Span::styled(format!("  normalizer={}", normalizer), app.theme.muted));
    }
    if !field.searchable {
        spans.push(Span::styled(
            "  not searchable",
            Style::default().fg(app.theme.warning),
        ));
    }
    if field.stored {
        spans.push(Span::styled("  stored", app.theme.muted));
    }
    lines.push(Line::from(spans));

    for multi in &field.multi_fields {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{}  .{}", indent, multi.name),
                app.theme.muted,
            ),
            Span::raw("  "),
            Span::styled(
                or_dash(&multi.field_type).to_string(),
                Style::default().fg(app.theme.highlight),
            ),
        ]));
    }
    for child in &field.properties {
        push_field(app, child, depth + 1, lines);
    }
}
