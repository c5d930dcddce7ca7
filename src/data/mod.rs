//! Core data models for Genreshelf
//!
//! This module contains the normalized book shape served from the cache,
//! along with the clients for the upstream catalog and author lookup APIs.

pub mod author;
pub mod catalog;
pub mod format;

pub use author::{AuthorClient, AuthorError};
pub use catalog::{CatalogClient, CatalogError, CatalogSource, RawVolume, SimilarQuery};
pub use format::{format_book, format_books, format_date};

use serde::{Deserialize, Serialize};

/// Placeholder cover shown when the catalog has no thumbnail for a volume
pub const PLACEHOLDER_COVER_URL: &str = "https://via.placeholder.com/200x300.png?text=No+Cover";

/// A normalized catalog record, as stored in the cache and served to callers
///
/// `published_date` is omitted from serialized output entirely when the
/// upstream date could not be normalized, while every other missing field
/// carries a default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Upstream volume identifier
    pub id: String,
    pub title: String,
    /// Author names in upstream order
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    pub publisher: String,
    /// Long-form date such as "April 05, 2023"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    pub description: String,
    pub page_count: u32,
    /// Category tags in upstream order
    pub categories: Vec<String>,
    /// Cover thumbnail, or [`PLACEHOLDER_COVER_URL`]
    #[serde(rename = "image_url")]
    pub image_url: String,
    /// Language code (e.g. "en")
    pub language: String,
}

impl Book {
    /// First listed author, if any
    pub fn primary_author(&self) -> Option<&str> {
        self.authors.first().map(String::as_str)
    }
}

/// Biography details for an author, from the encyclopedia lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorDetails {
    /// Plain-text introduction of the author's article
    pub description: String,
    /// Portrait thumbnail, empty when the article has none
    pub image_url: String,
}
