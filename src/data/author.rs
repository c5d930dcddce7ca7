//! Wikipedia author lookup client
//!
//! Resolves an author name to a Wikipedia article and returns its plain-text
//! introduction and portrait thumbnail. Used only to enrich book details.

use std::collections::BTreeMap;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::AuthorDetails;

/// Base URL for the Wikipedia action API
pub const WIKIPEDIA_BASE_URL: &str = "https://en.wikipedia.org/w/api.php";

/// Portrait thumbnail width requested from Wikipedia
const THUMBNAIL_SIZE: u32 = 500;

/// Errors that can occur when looking up an author
#[derive(Debug, Error)]
pub enum AuthorError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Wikipedia answered with a non-success status
    #[error("Wikipedia responded with status {0}")]
    Status(u16),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// No author name was given
    #[error("An author name is required")]
    MissingName,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchResponse {
    query: SearchQuery,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchQuery {
    search: Vec<SearchHit>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExtractResponse {
    query: ExtractQuery,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExtractQuery {
    /// Keyed by page id
    pages: BTreeMap<String, PageEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageEntry {
    extract: String,
    thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Thumbnail {
    source: String,
}

/// Client for fetching author biographies from Wikipedia
#[derive(Debug, Clone)]
pub struct AuthorClient {
    client: Client,
    base_url: String,
}

impl Default for AuthorClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthorClient {
    /// Create a new AuthorClient with default settings
    pub fn new() -> Self {
        Self::with_base_url(WIKIPEDIA_BASE_URL)
    }

    /// Create a new AuthorClient pointed at a different endpoint
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Create a new AuthorClient sharing an existing HTTP client
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Fetches the biography of an author
    ///
    /// # Returns
    /// * `Ok(Some(AuthorDetails))` - The article introduction and/or portrait
    /// * `Ok(None)` - No matching article, or the article has neither
    /// * `Err(AuthorError)` - If a request or parsing fails
    pub async fn fetch_author(&self, name: &str) -> Result<Option<AuthorDetails>, AuthorError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthorError::MissingName);
        }

        let Some(title) = self.find_page_title(name).await? else {
            return Ok(None);
        };

        let thumbnail_size = THUMBNAIL_SIZE.to_string();
        let body: ExtractResponse = self
            .get_json(&[
                ("action", "query"),
                ("prop", "extracts|pageimages"),
                ("exintro", "true"),
                ("explaintext", "true"),
                ("titles", title.as_str()),
                ("pithumbsize", thumbnail_size.as_str()),
                ("format", "json"),
            ])
            .await?;

        let Some(page) = body.query.pages.into_values().next() else {
            return Ok(None);
        };

        let image_url = page.thumbnail.map(|t| t.source).unwrap_or_default();
        if page.extract.is_empty() && image_url.is_empty() {
            return Ok(None);
        }

        Ok(Some(AuthorDetails {
            description: page.extract,
            image_url,
        }))
    }

    /// Returns the title of the best-matching article for `name`
    async fn find_page_title(&self, name: &str) -> Result<Option<String>, AuthorError> {
        let body: SearchResponse = self
            .get_json(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", name),
                ("format", "json"),
            ])
            .await?;

        Ok(body
            .query
            .search
            .into_iter()
            .next()
            .map(|hit| hit.title)
            .filter(|title| !title.is_empty()))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
    ) -> Result<T, AuthorError> {
        let response = self.client.get(&self.base_url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthorError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}
