//! Chrome shared by every screen: header, menu, footer, overlays.

use chrono::Local;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::Viewport;
use crate::app::{App, Panel, View};

/// Render the header bar: cluster identity, health and refresh state.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = Span::styled(" ostop ", Style::default().add_modifier(Modifier::BOLD));

    let Some(ref data) = app.data else {
        let state = if app.loading { "Connecting..." } else { "No data" };
        let line = Line::from(vec![
            title,
            Span::raw("│ "),
            Span::raw(app.endpoint.clone()),
            Span::raw(" │ "),
            Span::styled(state, app.theme.muted),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let health = &data.health;
    let refreshed = data.refreshed_at.with_timezone(&Local).format("%H:%M:%S");
    let refresh_state = if app.loading {
        Span::styled("refreshing...", Style::default().fg(app.theme.highlight))
    } else {
        Span::styled(format!("refreshed {}", refreshed), app.theme.muted)
    };

    let line = Line::from(vec![
        Span::styled(" ● ", app.theme.cluster_status_style(&health.status)),
        title,
        Span::raw("│ "),
        Span::styled(
            health.cluster_name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            format!("[{}]", health.status),
            app.theme.cluster_status_style(&health.status),
        ),
        Span::raw(format!(" {} nodes", health.number_of_nodes)),
        Span::raw(" │ "),
        Span::raw(app.endpoint.clone()),
        Span::raw(" │ "),
        refresh_state,
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the navigation menu in the left panel.
pub fn render_menu(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = View::MENU
        .iter()
        .map(|view| {
            let marker = match view {
                View::LiveMetrics if app.metrics_enabled => " ◉",
                View::ThreadPoolMonitor if app.thread_pool_enabled => " ◉",
                _ => "",
            };
            ListItem::new(format!("{}{}", view.label(), marker))
        })
        .collect();

    let focused = app.active_panel == Panel::Left;
    let block = Block::default()
        .title(" Menu ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(app.theme.panel_border(focused));

    let list = List::new(items)
        .block(block)
        .highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = ListState::default().with_selected(Some(app.selected_menu_item));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Render the footer with key hints for the focused panel.
pub fn render_footer(frame: &mut Frame, app: &App, viewport: Viewport, area: Rect) {
    let controls = if app.show_help {
        "Press any key to close help"
    } else if app.active_panel == Panel::Left {
        "↑↓:navigate Enter:open Tab:content r:refresh ?:help q:quit"
    } else {
        match app.current_view {
            View::Indices => "↑↓:select PgUp/PgDn:page Enter:schema Tab:menu r:refresh ?:help q:quit",
            View::IndexSchema => "↑↓:scroll PgUp/PgDn:page Esc:back Tab:menu ?:help q:quit",
            _ => "↑↓:scroll PgUp/PgDn:page Home/End Tab:menu r:refresh ?:help q:quit",
        }
    };

    let mut spans = vec![Span::raw(format!(" {}", controls))];
    if viewport.max_scroll > 0 {
        spans.push(Span::styled(
            format!(" │ line {}/{}", app.scroll + 1, viewport.max_scroll + 1),
            Style::default().fg(app.theme.highlight),
        ));
    }

    let paragraph =
        Paragraph::new(Line::from(spans)).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the error banner that replaces the content of the right panel.
pub fn render_error(frame: &mut Frame, app: &App, message: &str, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Request failed",
            Style::default()
                .fg(app.theme.critical)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled("Press r to retry", app.theme.muted)),
    ];

    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(Span::styled(title, Style::default().add_modifier(Modifier::BOLD)))
    };

    let help_text = vec![
        Line::from(Span::styled("Keyboard Shortcuts", app.theme.header)),
        Line::from(""),
        section(" Navigation"),
        Line::from("  Tab         Switch menu/content"),
        Line::from("  ↑/↓ k/j     Move or scroll"),
        Line::from("  PgUp/PgDn   Page up/down"),
        Line::from("  Home/End    Jump to top/bottom"),
        Line::from("  Enter       Open screen / index schema"),
        Line::from("  Esc         Back from schema"),
        Line::from(""),
        section(" General"),
        Line::from("  r           Refresh cluster data"),
        Line::from("  ?           Toggle this help"),
        Line::from("  q Ctrl-C    Quit"),
        Line::from(""),
        Line::from(Span::styled("Press any key to close", app.theme.muted)),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let width = 44u16.min(area.width.saturating_sub(4));
    let height = (help_text.len() as u16 + 2).min(area.height.saturating_sub(2));
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    let help_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(Paragraph::new(help_text).block(block), help_area);
}

/// Shown instead of the dashboard when the terminal cannot fit it.
pub fn render_too_small(frame: &mut Frame, app: &App, area: Rect) {
    let msg = format!(
        "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
        area.width,
        area.height,
        super::MIN_WIDTH,
        super::MIN_HEIGHT
    );
    let paragraph = Paragraph::new(msg)
        .alignment(Alignment::Center)
        .style(Style::default().fg(app.theme.warning));
    let y = area.y + (area.height / 2).saturating_sub(2);
    let centered = Rect::new(area.x, y, area.width, 5.min(area.height));
    frame.render_widget(paragraph, centered);
}
