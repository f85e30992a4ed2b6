//! Text formatting helpers for the panels.

use ratatui::{
    style::Style,
    text::{Line, Span},
};

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Format a count for display (e.g., 1234 -> "1.2K", 1234567 -> "1.2M").
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.1}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Format a byte size with binary units, e.g. "1.5gb".
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["b", "kb", "mb", "gb", "tb"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{}b", bytes)
    } else {
        format!("{:.1}{}", value, UNITS[unit])
    }
}

/// Format a per-second rate, e.g. "1.2K/s".
pub fn format_rate(rate: f64) -> String {
    if rate >= 1_000.0 {
        format!("{}/s", format_count(rate as u64))
    } else {
        format!("{:.1}/s", rate)
    }
}

/// Render the last `width` values as a sparkline scaled to their maximum.
pub fn sparkline(values: &[f64], width: usize) -> String {
    let start = values.len().saturating_sub(width);
    let window = &values[start..];
    let max = window.iter().copied().fold(0.0, f64::max);

    window
        .iter()
        .map(|&v| {
            if max <= 0.0 {
                SPARKLINE_CHARS[0]
            } else {
                let level = (v.max(0.0) / max * 7.0).round() as usize;
                SPARKLINE_CHARS[level.min(7)]
            }
        })
        .collect()
}

/// A text gauge for a percentage reported as a string, e.g. "██████░░░░ 61%".
/// Blank or unparseable input yields "-".
pub fn percent_bar(percent: &str, width: usize) -> String {
    let Ok(value) = percent.trim().parse::<f64>() else {
        return "-".to_string();
    };
    let clamped = value.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * width as f64).round() as usize;
    format!(
        "{}{} {:>3.0}%",
        "█".repeat(filled),
        "░".repeat(width - filled),
        value
    )
}

/// Show blank cat values as "-".
pub fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

/// Lay out rows as aligned columns. Each row carries an optional style for
/// its whole line.
pub fn table_lines(
    header_style: Style,
    headers: &[&str],
    rows: Vec<(Vec<String>, Style)>,
) -> Vec<Line<'static>> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for (cells, _) in &rows {
        for (i, cell) in cells.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let pad = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let mut lines = vec![Line::from(Span::styled(pad(&header), header_style))];
    lines.extend(
        rows.into_iter()
            .map(|(cells, style)| Line::from(Span::styled(pad(&cells), style))),
    );
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_234), "1.2K");
        assert_eq!(format_count(1_234_567), "1.2M");
        assert_eq!(format_count(2_500_000_000), "2.5B");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512b");
        assert_eq!(format_bytes(1536), "1.5kb");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0gb");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(0.0), "0.0/s");
        assert_eq!(format_rate(100.0), "100.0/s");
        assert_eq!(format_rate(2_500.0), "2.5K/s");
    }

    #[test]
    fn test_sparkline_scales_to_max() {
        assert_eq!(sparkline(&[0.0, 50.0, 100.0], 8), "▁▅█");
        assert_eq!(sparkline(&[0.0, 0.0], 8), "▁▁");
        assert_eq!(sparkline(&[], 8), "");
        // Only the newest values fit
        assert_eq!(sparkline(&[100.0, 1.0, 2.0], 2), "▅█");
    }

    #[test]
    fn test_percent_bar() {
        assert_eq!(percent_bar("50", 4), "██░░  50%");
        assert_eq!(percent_bar("", 4), "-");
        assert_eq!(percent_bar("n/a", 4), "-");
        assert_eq!(percent_bar("130", 2), "██ 130%");
    }

    #[test]
    fn test_table_lines_align_columns() {
        let rows = vec![
            (vec!["a".to_string(), "1".to_string()], Style::default()),
            (vec!["longer".to_string(), "22".to_string()], Style::default()),
        ];
        let lines = table_lines(Style::default(), &["name", "n"], rows);
        let text: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        assert_eq!(text, vec!["name    n", "a       1", "longer  22"]);
    }
}
