//! Book list screen rendering
//!
//! Shows the batch handed out by the last drain of a genre.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::Book;
use crate::ui::{key_hints, render_status};

/// Truncates `text` to `width` characters, marking the cut with an ellipsis
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn book_line(book: &Book, is_selected: bool) -> Line<'static> {
    let cursor = if is_selected { "\u{25B8} " } else { "  " }; // ▸

    let title_style = if is_selected {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let author = book.primary_author().unwrap_or("Unknown author");
    let year = book
        .published_date
        .as_deref()
        .and_then(|date| date.rsplit(' ').next())
        .unwrap_or("----");

    Line::from(vec![
        Span::styled(cursor, Style::default().fg(Color::Cyan)),
        Span::styled(format!("{:<36}", truncate(&book.title, 36)), title_style),
        Span::raw(" "),
        Span::styled(
            format!("{:<22}", truncate(author, 22)),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(year.to_string(), Style::default().fg(Color::DarkGray)),
    ])
}

/// Renders the drained books for `genre`
pub fn render(frame: &mut Frame, app: &App, genre: &str) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Book list
            Constraint::Length(1), // Status
            Constraint::Length(1), // Help text
        ])
        .split(area);

    render_list(frame, app, genre, chunks[0]);
    render_status(frame, chunks[1], app);

    let help = key_hints(&[
        ("Enter", "Details"),
        ("n", "Next batch"),
        ("e", "Extend"),
        ("Esc", "Back"),
        ("q", "Quit"),
    ]);
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        chunks[2],
    );
}

fn render_list(frame: &mut Frame, app: &App, genre: &str, area: Rect) {
    let block = Block::default()
        .title(format!(" {} ({}) ", genre, app.drained.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if app.drained.is_empty() {
        let message = Paragraph::new(Line::from(Span::styled(
            "No books in this batch",
            Style::default().fg(Color::DarkGray),
        )))
        .block(block);
        frame.render_widget(message, area);
        return;
    }

    let visible = (area.height as usize).saturating_sub(2).max(1);
    let first = app.selected_book.saturating_sub(visible - 1);

    let lines: Vec<Line> = app
        .drained
        .iter()
        .enumerate()
        .skip(first)
        .take(visible)
        .map(|(index, book)| book_line(book, index == app.selected_book))
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppState;
    use crate::ui::test_support::{app, book, draw};

    #[test]
    fn test_render_shows_titles_authors_and_years() {
        let mut app = app();
        app.state = AppState::BookList("fiction".to_string());
        app.drained = vec![
            book("a", "Dune", "Frank Herbert"),
            book("b", "Hyperion", "Dan Simmons"),
        ];

        let content = draw(90, 20, |frame| render(frame, &app, "fiction"));

        assert!(content.contains("fiction (2)"));
        assert!(content.contains("Dune"));
        assert!(content.contains("Dan Simmons"));
        assert!(content.contains("1965"));
    }

    #[test]
    fn test_render_empty_batch() {
        let app = app();
        let content = draw(80, 10, |frame| render(frame, &app, "horror"));
        assert!(content.contains("No books in this batch"));
    }

    #[test]
    fn test_missing_author_and_date_have_placeholders() {
        let mut missing = book("a", "Untitled", "x");
        missing.authors.clear();
        missing.published_date = None;

        let line = book_line(&missing, false);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();

        assert!(text.contains("Unknown author"));
        assert!(text.contains("----"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Dune", 10), "Dune");
        assert_eq!(truncate("The Left Hand of Darkness", 10), "The Left …");
    }
}
