//! UI rendering module for Genreshelf
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod book_detail;
pub mod book_list;
pub mod genre_list;
pub mod help_overlay;

pub use book_detail::render as render_book_detail;
pub use book_list::render as render_book_list;
pub use genre_list::render_genre_list;
pub use help_overlay::render as render_help_overlay;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

/// Renders the result of the last operation, if any
pub(crate) fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let Some(ref status) = app.status else {
        return;
    };

    let (marker, color) = if status.is_error {
        ("\u{2717} ", Color::Red) // ✗
    } else {
        ("\u{2713} ", Color::Green) // ✓
    };

    let line = Line::from(vec![
        Span::styled(marker, Style::default().fg(color)),
        Span::styled(status.text.clone(), Style::default().fg(color)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Builds a key hint line such as "Enter Drain  q Quit"
pub(crate) fn key_hints(hints: &[(&str, &str)]) -> Line<'static> {
    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (key, action) in hints {
        spans.push(Span::styled(
            key.to_string(),
            Style::default().fg(Color::Yellow),
        ));
        spans.push(Span::raw(format!(" {}  ", action)));
    }
    Line::from(spans)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    use crate::app::App;
    use crate::cache::testing::MockCatalog;
    use crate::cache::CacheManager;
    use crate::config::CacheConfig;
    use crate::data::{AuthorClient, Book, PLACEHOLDER_COVER_URL};

    /// App over the default genres, backed by the in-memory catalog
    pub fn app() -> App {
        let cache = CacheManager::from_config(Arc::new(MockCatalog::new()), &CacheConfig::default());
        App::new(
            Arc::new(cache),
            AuthorClient::with_base_url("http://127.0.0.1:9"),
            7,
        )
    }

    pub fn book(id: &str, title: &str, author: &str) -> Book {
        Book {
            id: id.to_string(),
            title: title.to_string(),
            authors: vec![author.to_string()],
            series: None,
            publisher: "Ace".to_string(),
            published_date: Some("August 01, 1965".to_string()),
            description: "A desert planet and its spice.".to_string(),
            page_count: 412,
            categories: vec!["Fiction".to_string()],
            image_url: PLACEHOLDER_COVER_URL.to_string(),
            language: "en".to_string(),
        }
    }

    /// Draws with `render` and returns the buffer as one string
    pub fn draw(width: u16, height: u16, render: impl FnOnce(&mut ratatui::Frame)) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(render).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    pub fn buffer_text(buffer: &Buffer) -> String {
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{app, draw};
    use super::*;
    use crate::app::StatusMessage;

    #[test]
    fn test_status_line_shows_error_text() {
        let mut app = app();
        app.status = Some(StatusMessage::error("No cached books for 'horror'"));

        let content = draw(60, 3, |frame| {
            let area = frame.area();
            render_status(frame, area, &app)
        });

        assert!(content.contains("No cached books for 'horror'"));
    }

    #[test]
    fn test_status_line_empty_without_status() {
        let app = app();
        let content = draw(40, 1, |frame| {
            let area = frame.area();
            render_status(frame, area, &app)
        });
        assert!(content.trim().is_empty());
    }

    #[test]
    fn test_key_hints_lists_keys_and_actions() {
        let line = key_hints(&[("Enter", "Drain"), ("q", "Quit")]);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "Enter Drain  q Quit  ");
    }
}
