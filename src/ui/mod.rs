//! Terminal rendering.
//!
//! Rendering is a pure function of [`App`]: [`render`] draws one frame and
//! reports the scrollable extent of the right panel so the event loop can
//! feed it back through [`App::set_viewport`].
//!
//! ```text
//! ┌ header: cluster, status, endpoint, last refresh ─────────┐
//! ├ menu ──────┬ content of the current view ────────────────┤
//! │            │                                             │
//! ├────────────┴─────────────────────────────────────────────┤
//! └ footer: key hints, scroll position ──────────────────────┘
//! ```

pub mod common;
pub mod content;
pub mod format;
pub mod monitor;
pub mod theme;

use ratatui::{
    layout::{Constraint, Layout},
    Frame,
};

pub use theme::Theme;

use crate::app::App;

/// Smallest terminal the dashboard draws into.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 12;

const MENU_WIDTH: u16 = 24;

/// Scroll extent of the right panel after a draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    /// Largest useful scroll offset for the current content.
    pub max_scroll: usize,
    /// Rows visible at once.
    pub page_height: usize,
}

/// Draw one frame.
pub fn render(frame: &mut Frame, app: &App) -> Viewport {
    let area = frame.area();
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        common::render_too_small(frame, app, area);
        return Viewport::default();
    }

    let [header, body, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(8),
        Constraint::Length(1),
    ])
    .areas(area);
    let [menu, main] =
        Layout::horizontal([Constraint::Length(MENU_WIDTH), Constraint::Min(20)]).areas(body);

    common::render_header(frame, app, header);
    common::render_menu(frame, app, menu);
    let viewport = content::render(frame, app, main);
    common::render_footer(frame, app, viewport, footer);

    if app.show_help {
        common::render_help(frame, app, area);
    }

    viewport
}


#[cfg(test)]
mod tests {
    use super::test_util::{draw, text};
    use super::*;
    use crate::message::{Input, Message};

    #[test]
    fn test_too_small_terminal() {
        let app = App::new("http://localhost:9200", 12);
        let (buffer, viewport) = draw(&app, 40, 10);
        assert!(text(&buffer).contains("Terminal too small"));
        assert_eq!(viewport, Viewport::default());
    }

    #[test]
    fn test_frame_before_first_refresh() {
        let app = App::new("http://localhost:9200", 12);
        let (buffer, _) = draw(&app, 100, 30);
        let screen = text(&buffer);
        assert!(screen.contains("http://localhost:9200"));
        assert!(screen.contains("Connecting..."));
        assert!(screen.contains("Cluster Overview"));
        assert!(screen.contains("Templates"));
    }

    #[test]
    fn test_help_overlay() {
        let mut app = App::new("http://localhost:9200", 12);
        app.update(Message::Input(Input::ToggleHelp));
        let (buffer, _) = draw(&app, 100, 30);
        let screen = text(&buffer);
        assert!(screen.contains("Keyboard Shortcuts"));
        assert!(screen.contains("Press any key to close"));
    }
}
