//! Genre list screen rendering
//!
//! Renders the main view: every configured genre with its catalog cursor and
//! the number of books waiting in its cache.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::cache::CategorySnapshot;
use crate::ui::{key_hints, render_status};

/// Color for a genre's queue depth relative to one drain
fn queue_color(queued: Option<usize>, drain_size: usize) -> Color {
    match queued {
        None | Some(0) => Color::DarkGray,
        Some(n) if n < drain_size => Color::Yellow,
        Some(_) => Color::Green,
    }
}

/// Human-readable queue depth
fn queue_label(queued: Option<usize>) -> String {
    match queued {
        None => "not cached".to_string(),
        Some(1) => "1 book".to_string(),
        Some(n) => format!("{} books", n),
    }
}

/// Renders the genre list screen
///
/// Displays each genre on its own line with:
/// - Genre name
/// - Books queued (or "not cached")
/// - Offset of the next catalog fetch
///
/// The currently selected genre is highlighted with a cursor indicator.
pub fn render_genre_list(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Min(3),    // Genre list
            Constraint::Length(1), // Status
            Constraint::Length(1), // Help text
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    render_list(frame, app, chunks[1]);
    render_status(frame, chunks[2], app);
    render_help(frame, chunks[3], app);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let time_str = Local::now().format("%a %b %d, %H:%M").to_string();
    let separator = "─".repeat((area.width as usize).saturating_sub(2));

    let lines = vec![
        Line::from(vec![
            Span::styled(
                "GENRESHELF",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(time_str, Style::default().fg(Color::White)),
            Span::raw("  "),
            Span::styled(
                format!("batch {}", app.warm_limit()),
                Style::default().fg(Color::Yellow),
            ),
        ]),
        Line::from(Span::styled(
            separator,
            Style::default().fg(Color::DarkGray),
        )),
    ];

    frame.render_widget(Paragraph::new(lines), area);
}

fn genre_line(snapshot: &CategorySnapshot, is_selected: bool, drain_size: usize) -> Line<'static> {
    let cursor = if is_selected { "\u{25B8} " } else { "  " }; // ▸

    let name_style = if is_selected {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    Line::from(vec![
        Span::styled(cursor, Style::default().fg(Color::Cyan)),
        Span::styled(format!("{:<16}", snapshot.category), name_style),
        Span::styled(
            format!("{:>12}", queue_label(snapshot.queued)),
            Style::default().fg(queue_color(snapshot.queued, drain_size)),
        ),
        Span::styled(
            format!("   next @ {}", snapshot.cursor),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    // A bordered list only has room for area.height - 2 rows
    let visible = (area.height as usize).saturating_sub(2).max(1);
    let first = app.selected_genre.saturating_sub(visible - 1);

    let drain_size = app.drain_size();
    let lines: Vec<Line> = app
        .shelf
        .iter()
        .enumerate()
        .skip(first)
        .take(visible)
        .map(|(index, snapshot)| genre_line(snapshot, index == app.selected_genre, drain_size))
        .collect();

    let block = Block::default()
        .title(" Genres ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Renders the help text at the bottom of the screen with cache freshness
fn render_help(frame: &mut Frame, area: Rect, app: &App) {
    let mut line = key_hints(&[
        ("↑/↓", "Navigate"),
        ("Enter", "Drain"),
        ("e", "Extend"),
        ("w", "Warm up"),
        ("?", "Help"),
        ("q", "Quit"),
    ]);

    if let Some(last_refresh) = app.last_refresh {
        let elapsed = Local::now() - last_refresh;
        let mins_ago = elapsed.num_minutes();
        let freshness_text = if mins_ago < 1 {
            "│ Cache: just now".to_string()
        } else if mins_ago < 60 {
            format!("│ Cache: {}m ago", mins_ago)
        } else {
            format!("│ Cache: {}h ago", elapsed.num_hours())
        };
        line.spans.push(Span::styled(
            freshness_text,
            Style::default().fg(Color::DarkGray),
        ));
    }

    let paragraph = Paragraph::new(line).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}
