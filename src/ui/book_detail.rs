//! Book detail screen UI
//!
//! Renders every field of one drained book, plus the author biography once
//! it has been looked up.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, AuthorPanel};
use crate::data::Book;
use crate::ui::{key_hints, render_status};

mod colors {
    use ratatui::style::Color;

    /// Section headers
    pub const HEADER: Color = Color::Cyan;
    /// Field labels
    pub const LABEL: Color = Color::Gray;
    /// Primary text
    pub const PRIMARY: Color = Color::White;
    /// Missing values
    pub const UNKNOWN: Color = Color::DarkGray;
}

/// Renders the detail screen for the book at `index` of the last batch
pub fn render(frame: &mut Frame, app: &App, index: usize) {
    let area = frame.area();

    let Some(book) = app.drained.get(index) else {
        render_no_book(frame, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(11), // Facts
            Constraint::Min(4),     // Description / author
            Constraint::Length(1),  // Status
            Constraint::Length(1),  // Help text
        ])
        .split(area);

    render_facts(frame, book, chunks[0]);

    match app.author {
        Some(ref panel) => {
            let halves = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(chunks[1]);
            render_description(frame, book, halves[0]);
            render_author(frame, panel, halves[1]);
        }
        None => render_description(frame, book, chunks[1]),
    }

    render_status(frame, chunks[2], app);

    let help = key_hints(&[("a", "Author"), ("Esc", "Back"), ("q", "Quit")]);
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        chunks[3],
    );
}

fn field(label: &str, value: impl Into<String>) -> Line<'static> {
    let value = value.into();
    let value_style = if value.is_empty() {
        Style::default().fg(colors::UNKNOWN)
    } else {
        Style::default().fg(colors::PRIMARY)
    };
    let value = if value.is_empty() { "--".to_string() } else { value };

    Line::from(vec![
        Span::styled(format!("{:<11}", label), Style::default().fg(colors::LABEL)),
        Span::styled(value, value_style),
    ])
}

fn build_fact_lines(book: &Book) -> Vec<Line<'static>> {
    let mut lines = vec![
        field("Authors", book.authors.join(", ")),
        field("Publisher", book.publisher.clone()),
        field(
            "Published",
            book.published_date.clone().unwrap_or_default(),
        ),
        field("Pages", book.page_count.to_string()),
        field("Categories", book.categories.join(", ")),
        field("Language", book.language.clone()),
        field("Cover", book.image_url.clone()),
    ];

    if let Some(ref series) = book.series {
        lines.insert(1, field("Series", series.clone()));
    }

    lines.push(field("ID", book.id.clone()));
    lines
}

fn render_facts(frame: &mut Frame, book: &Book, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::HEADER))
        .title(Span::styled(
            format!(" {} ", book.title),
            Style::default()
                .fg(colors::PRIMARY)
                .add_modifier(Modifier::BOLD),
        ));

    frame.render_widget(Paragraph::new(build_fact_lines(book)).block(block), area);
}

fn render_description(frame: &mut Frame, book: &Book, area: Rect) {
    let text = if book.description.is_empty() {
        Line::from(Span::styled(
            "No description",
            Style::default().fg(colors::UNKNOWN),
        ))
    } else {
        Line::from(book.description.clone())
    };

    let block = Block::default()
        .title(" Description ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::HEADER));

    frame.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn render_author(frame: &mut Frame, panel: &AuthorPanel, area: Rect) {
    let lines = match panel.details {
        Some(ref details) => {
            let mut lines = vec![Line::from(details.description.clone())];
            if !details.image_url.is_empty() {
                lines.push(Line::default());
                lines.push(Line::from(Span::styled(
                    details.image_url.clone(),
                    Style::default().fg(colors::LABEL),
                )));
            }
            lines
        }
        None => vec![Line::from(Span::styled(
            "No biography found",
            Style::default().fg(colors::UNKNOWN),
        ))],
    };

    let block = Block::default()
        .title(format!(" {} ", panel.name))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::HEADER));

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

/// Renders a message when the selected book is no longer in the batch
fn render_no_book(frame: &mut Frame, area: Rect) {
    let message = Paragraph::new(vec![
        Line::default(),
        Line::from(Span::styled(
            "This book is no longer available",
            Style::default().fg(colors::UNKNOWN),
        )),
        Line::default(),
        key_hints(&[("Esc", "Back"), ("q", "Quit")]),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors::HEADER)),
    );

    frame.render_widget(message, area);
}
