//! Record formatter for catalog volumes
//!
//! Normalizes raw catalog records into [`Book`]s. Missing fields fall back to
//! defaults, except the published date, which is dropped when it cannot be
//! normalized.

use chrono::NaiveDate;

use super::catalog::RawVolume;
use super::{Book, PLACEHOLDER_COVER_URL};

/// Two-digit year input shape, e.g. "23/04/05"
const SHORT_YEAR_FORMAT: &str = "%y/%m/%d";

/// Four-digit year input shape, e.g. "2023/04/05"
const LONG_YEAR_FORMAT: &str = "%Y/%m/%d";

/// Output shape, e.g. "April 05, 2023"
const DISPLAY_FORMAT: &str = "%B %d, %Y";

/// Formats at most `limit` raw volumes, preserving their order
pub fn format_books(raw: Vec<RawVolume>, limit: usize) -> Vec<Book> {
    raw.into_iter().take(limit).map(format_book).collect()
}

/// Formats a single raw volume
pub fn format_book(raw: RawVolume) -> Book {
    let info = raw.volume_info.unwrap_or_default();

    let series = info
        .series
        .and_then(|entries| entries.into_iter().next())
        .and_then(|entry| entry.name);

    let image_url = info
        .image_links
        .and_then(|links| links.thumbnail)
        .unwrap_or_else(|| PLACEHOLDER_COVER_URL.to_string());

    let published_date = info
        .published_date
        .as_deref()
        .filter(|date| !date.is_empty())
        .and_then(format_date);

    Book {
        id: raw.id.unwrap_or_default(),
        title: info.title.unwrap_or_default(),
        authors: info.authors.unwrap_or_default(),
        series,
        publisher: info.publisher.unwrap_or_default(),
        published_date,
        description: info.description.unwrap_or_default(),
        page_count: info.page_count.unwrap_or(0),
        categories: info.categories.unwrap_or_default(),
        image_url,
        language: info.language.unwrap_or_default(),
    }
}

/// Converts a `yy/mm/dd` or `yyyy/mm/dd` date to `Month DD, YYYY`
///
/// Returns `None` for any other shape.
pub fn format_date(raw: &str) -> Option<String> {
    // chrono accepts signed and variable-width years, so pin the year shape first
    let year = raw.split('/').next()?;
    if !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let format = match year.len() {
        2 => SHORT_YEAR_FORMAT,
        4 => LONG_YEAR_FORMAT,
        _ => return None,
    };

    let date = NaiveDate::parse_from_str(raw, format).ok()?;

    Some(date.format(DISPLAY_FORMAT).to_string())
}
