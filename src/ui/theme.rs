//! Colors and styles, with light/dark selection from the terminal background.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::PoolHealth;

/// Color and style theme for the dashboard.
///
/// Use [`Theme::auto_detect()`] to pick from the terminal background, or
/// [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent for the focused panel and selections.
    pub highlight: Color,
    pub warning: Color,
    pub critical: Color,
    pub healthy: Color,
    pub border: Color,
    /// Table and section headings.
    pub header: Style,
    pub selected: Style,
    /// Secondary text such as hints and timestamps.
    pub muted: Style,
    pub border_type: BorderType,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            muted: Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
            border_type: BorderType::Rounded,
        }
    }

    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            muted: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Pick light or dark from the terminal background luminance.
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Style for a `green`/`yellow`/`red` health string as reported by the
    /// cluster (cluster, index or shard health).
    pub fn cluster_status_style(&self, status: &str) -> Style {
        match status {
            "green" => Style::default().fg(self.healthy),
            "yellow" => Style::default().fg(self.warning),
            "red" => Style::default().fg(self.critical).add_modifier(Modifier::BOLD),
            _ => self.muted,
        }
    }

    pub fn pool_health_style(&self, health: PoolHealth) -> Style {
        match health {
            PoolHealth::Healthy => Style::default().fg(self.healthy),
            PoolHealth::Warning => Style::default().fg(self.warning),
            PoolHealth::Critical => Style::default().fg(self.critical).add_modifier(Modifier::BOLD),
        }
    }

    /// Border style for a panel, accented when it has focus.
    pub fn panel_border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.highlight)
        } else {
            Style::default().fg(self.border)
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
