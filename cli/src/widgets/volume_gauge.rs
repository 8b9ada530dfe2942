use ratatui::{
    style::{Color, Style, Stylize},
    text::{Line, Span},
};

const BAR_WIDTH: usize = 20;
const LABEL_WIDTH: usize = 18;

/// Filled cells for a volume in `[0, 1]` on a bar `width` cells wide.
pub fn filled_cells(vol_f: f64, width: usize) -> usize {
    let vol_f = if vol_f.is_nan() { 0.0 } else { vol_f.clamp(0.0, 1.0) };
    ((vol_f * width as f64).round() as usize).min(width)
}

/// One row of the control list: label, bar, percentage and mute marker.
pub fn control_line(label: &str, vol_f: f64, mute: bool, indent: usize) -> Line<'static> {
    let filled = filled_cells(vol_f, BAR_WIDTH);
    let bar_color = if mute { Color::DarkGray } else { Color::Cyan };
    let label_width = LABEL_WIDTH.saturating_sub(indent);

    let mut label: String = label.chars().take(label_width).collect();
    let padding = label_width.saturating_sub(label.chars().count());
    label.push_str(&" ".repeat(padding));

    Line::from(vec![
        Span::raw(" ".repeat(indent)),
        Span::raw(label),
        Span::raw(" ["),
        Span::styled("█".repeat(filled), Style::default().fg(bar_color)),
        Span::raw("·".repeat(BAR_WIDTH - filled)),
        Span::raw("] "),
        Span::raw(format!("{:>3}%", (vol_f.clamp(0.0, 1.0) * 100.0).round() as u32)),
        if mute {
            Span::raw(" muted").red()
        } else {
            Span::raw("")
        },
    ])
}
