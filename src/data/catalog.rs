//! Google Books catalog API client
//!
//! This module fetches volumes from the Google Books API and exposes the
//! [`CatalogSource`] trait the cache manager fetches through.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::format::format_books;
use super::Book;
use crate::config::CatalogConfig;

/// Base URL for the Google Books volumes endpoint
pub const GOOGLE_BOOKS_BASE_URL: &str = "https://www.googleapis.com/books/v1/volumes";

/// Field projection requested for every volume query
const VOLUME_FIELDS: &str = "items(id,volumeInfo/title,volumeInfo/authors,volumeInfo/publisher,volumeInfo/publishedDate,volumeInfo/description,volumeInfo/pageCount,volumeInfo/categories,volumeInfo/imageLinks/thumbnail,volumeInfo/language)";

/// Errors that can occur when querying the catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("Catalog API responded with status {0}")]
    Status(u16),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The query could not be built from the given input
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl CatalogError {
    /// Upstream HTTP status, when the failure carries one
    pub fn status(&self) -> Option<u16> {
        match self {
            CatalogError::Status(code) => Some(*code),
            CatalogError::RequestFailed(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Volumes response body; `items` is absent when nothing matched
#[derive(Debug, Default, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Option<Vec<RawVolume>>,
}

/// A single volume as returned by the catalog
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVolume {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub volume_info: Option<VolumeInfo>,
}

/// Nested metadata of a volume
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolumeInfo {
    pub title: Option<String>,
    pub authors: Option<Vec<String>>,
    pub series: Option<Vec<SeriesEntry>>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub description: Option<String>,
    pub page_count: Option<u32>,
    pub categories: Option<Vec<String>>,
    pub image_links: Option<ImageLinks>,
    pub language: Option<String>,
}

/// Series membership entry
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SeriesEntry {
    #[serde(alias = "title")]
    pub name: Option<String>,
}

/// Cover image links
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImageLinks {
    pub thumbnail: Option<String>,
}

/// Paginated subject source the cache manager fetches from
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetches up to `limit` raw volumes for `subject`, starting at `start_index`
    async fn fetch_subject(
        &self,
        subject: &str,
        limit: u32,
        start_index: u32,
    ) -> Result<Vec<RawVolume>, CatalogError>;
}

/// Input for a similar-books lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarQuery {
    pub authors: Vec<String>,
    pub categories: Vec<String>,
    pub language: String,
    pub limit: u32,
}

impl SimilarQuery {
    /// Builds the catalog query string, rejecting incomplete input
    fn to_query(&self) -> Result<String, CatalogError> {
        if self.authors.is_empty() || self.categories.is_empty() || self.language.is_empty() {
            return Err(CatalogError::InvalidQuery(
                "authors, categories, and language are all required to find similar books"
                    .to_string(),
            ));
        }

        let authors = self.authors.iter().map(|a| format!("inauthor:{}", a));
        let subjects = self.categories.iter().map(|c| format!("subject:{}", c));

        Ok(authors.chain(subjects).collect::<Vec<_>>().join(" "))
    }
}

/// Returns true when `search` looks like an ISBN-10 or ISBN-13
pub fn is_isbn(search: &str) -> bool {
    (search.len() == 10 || search.len() == 13) && search.chars().all(|c| c.is_ascii_digit())
}

/// Client for the Google Books volumes API
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl Default for CatalogClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogClient {
    /// Create a new CatalogClient with default settings
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: GOOGLE_BOOKS_BASE_URL.to_string(),
            api_key: None,
        }
    }

    /// Create a CatalogClient from the `[catalog]` config section
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Create a new CatalogClient pointed at a different endpoint
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::new()
        }
    }

    /// Attach an API key to every request
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Fetches one page of books for a subject without touching any cache
    pub async fn browse(&self, subject: &str, limit: u32) -> Result<Vec<Book>, CatalogError> {
        let raw = self
            .get_volumes(vec![
                ("q", format!("subject:{}", subject)),
                ("maxResults", limit.to_string()),
            ])
            .await?;

        Ok(format_books(raw, limit as usize))
    }

    /// Searches by title, author, or ISBN
    ///
    /// ISBN lookups ignore `limit` on the request and only apply it when formatting.
    pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<Book>, CatalogError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CatalogError::InvalidQuery(
                "a search term is required".to_string(),
            ));
        }

        let params = if is_isbn(query) {
            vec![("q", format!("isbn:{}", query))]
        } else {
            vec![("q", query.to_string()), ("maxResults", limit.to_string())]
        };

        let raw = self.get_volumes(params).await?;
        Ok(format_books(raw, limit as usize))
    }

    /// Finds books sharing authors and categories with another book
    pub async fn similar(&self, query: &SimilarQuery) -> Result<Vec<Book>, CatalogError> {
        let q = query.to_query()?;

        let raw = self
            .get_volumes(vec![
                ("q", q),
                ("langRestrict", query.language.clone()),
                ("maxResults", query.limit.to_string()),
                ("orderBy", "relevance".to_string()),
            ])
            .await?;

        Ok(format_books(raw, query.limit as usize))
    }

    /// Sends a volumes query and returns the raw items
    async fn get_volumes(
        &self,
        mut params: Vec<(&str, String)>,
    ) -> Result<Vec<RawVolume>, CatalogError> {
        params.push(("fields", VOLUME_FIELDS.to_string()));
        if let Some(ref key) = self.api_key {
            params.push(("key", key.clone()));
        }

        let response = self.client.get(&self.base_url).query(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        let body: VolumesResponse = serde_json::from_str(&text)?;

        Ok(body.items.unwrap_or_default())
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn fetch_subject(
        &self,
        subject: &str,
        limit: u32,
        start_index: u32,
    ) -> Result<Vec<RawVolume>, CatalogError> {
        self.get_volumes(vec![
            ("q", format!("subject:{}", subject)),
            ("maxResults", limit.to_string()),
            ("startIndex", start_index.to_string()),
        ])
        .await
    }
}
