//! Help overlay showing all keybindings
//!
//! Renders a centered modal overlay with keyboard shortcuts.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Key bindings grouped by the view they apply in
const SECTIONS: [(&str, &[(&str, &str)]); 4] = [
    (
        "Everywhere",
        &[
            ("↑/k, ↓/j", "Move selection"),
            ("Esc", "Back / close"),
            ("?", "Toggle this help"),
            ("q", "Quit"),
        ],
    ),
    (
        "Genres",
        &[
            ("Enter, c", "Drain the selected genre"),
            ("e", "Fetch another batch"),
            ("w", "Warm up every genre"),
        ],
    ),
    (
        "Books",
        &[
            ("Enter", "Show details"),
            ("n", "Drain the next batch"),
            ("e", "Fetch another batch"),
        ],
    ),
    ("Details", &[("a", "Look up the first author")]),
];

/// Renders the help overlay on top of the current view
pub fn render(frame: &mut Frame) {
    let lines = build_lines();
    let height = lines.len() as u16 + 2;
    let overlay_area = centered_rect(50, height, frame.area());

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .title(" Keys ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Paragraph::new(lines).block(block), overlay_area);
}

fn build_lines() -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (title, bindings) in SECTIONS {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )));
        lines.extend(bindings.iter().map(|(key, description)| {
            Line::from(vec![
                Span::styled(format!("  {:<12}", key), Style::default().fg(Color::Yellow)),
                Span::raw(*description),
            ])
        }));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "Esc or ? closes",
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

/// Helper function to create a centered rect
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Length((area.height.saturating_sub(height)) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width.saturating_sub(width)) / 2),
            Constraint::Length(width),
            Constraint::Length((area.width.saturating_sub(width)) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
