//! Cache manager for per-genre book queues
//!
//! Provides a `CacheManager` that owns the cursor table and the cache store.
//! Each category's cursor and queue sit behind their own async mutex, held for
//! the whole read-cursor, fetch, format, commit sequence, so operations on one
//! category are serialized while different categories proceed independently.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{CacheConfig, CategoryConfig};
use crate::data::{format_books, Book, CatalogError, CatalogSource};

/// Number of books handed out per drain unless configured otherwise
pub const DEFAULT_DRAIN_SIZE: usize = 7;

/// Errors surfaced by cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    /// The catalog request for a category failed; never retried here
    #[error("Failed to fetch books for '{category}' from the catalog: {source}")]
    UpstreamFetchFailed {
        category: String,
        #[source]
        source: CatalogError,
    },

    /// Extend was asked for a category with no cache entry
    #[error("'{0}' does not exist in the cache")]
    CategoryNotCached(String),

    /// Drain was asked for a category with nothing cached
    #[error("No cached books for '{0}'")]
    NoCachedItems(String),

    /// A limit that is not a positive integer
    #[error("Limit '{0}' is not a valid positive integer")]
    InvalidLimit(String),
}

impl CacheError {
    /// Upstream HTTP status carried by a fetch failure
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            CacheError::UpstreamFetchFailed { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Category the failure refers to, if any
    pub fn category(&self) -> Option<&str> {
        match self {
            CacheError::UpstreamFetchFailed { category, .. }
            | CacheError::CategoryNotCached(category)
            | CacheError::NoCachedItems(category) => Some(category),
            CacheError::InvalidLimit(_) => None,
        }
    }
}

/// Parses a caller-supplied batch limit
///
/// # Returns
/// * `Ok(u32)` for a positive integer (surrounding whitespace ignored)
/// * `Err(CacheError::InvalidLimit)` for anything else, including zero
pub fn parse_limit(raw: &str) -> Result<u32, CacheError> {
    match raw.trim().parse::<u32>() {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => Err(CacheError::InvalidLimit(raw.to_string())),
    }
}

/// Result of a successful warm-up
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WarmUpSummary {
    /// Batch limit every category was fetched with
    pub limit: u32,
    /// Categories whose queue was replaced, with the number of books stored
    pub warmed: Vec<(String, usize)>,
    /// Categories the catalog returned nothing for; left untouched
    pub empty: Vec<String>,
}

/// Result of a successful extend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendOutcome {
    /// Books were appended to the tail of the queue
    Appended { count: usize },
    /// The catalog had nothing further; cursor and queue are unchanged
    NoNewItems,
}

/// Read-only view of one category's cache state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySnapshot {
    pub category: String,
    /// Offset of the next catalog fetch
    pub cursor: u32,
    /// Books waiting to be drained; `None` when there is no cache entry
    pub queued: Option<usize>,
}

/// Cursor and queue for a single category
#[derive(Debug, Default)]
struct CategoryState {
    cursor: u32,
    /// `None` until the first committed fetch, and again after a full drain
    queue: Option<Vec<Book>>,
}

#[derive(Debug)]
struct CategorySlot {
    name: String,
    state: Mutex<CategoryState>,
}

/// Owns the cursor table and cache store for a fixed set of categories
///
/// The category set is fixed at construction. Only the operations below read
/// or mutate the per-category state.
pub struct CacheManager {
    source: Arc<dyn CatalogSource>,
    /// In configured order
    slots: Vec<CategorySlot>,
    drain_size: usize,
}

impl CacheManager {
    /// Creates a manager for `categories`, each cursor at its start offset
    ///
    /// Repeated category names keep their first entry.
    pub fn new(source: Arc<dyn CatalogSource>, categories: &[CategoryConfig]) -> Self {
        let mut slots: Vec<CategorySlot> = Vec::with_capacity(categories.len());
        for category in categories {
            if slots.iter().any(|slot| slot.name == category.name) {
                continue;
            }
            slots.push(CategorySlot {
                name: category.name.clone(),
                state: Mutex::new(CategoryState {
                    cursor: category.start_offset,
                    queue: None,
                }),
            });
        }

        Self {
            source,
            slots,
            drain_size: DEFAULT_DRAIN_SIZE,
        }
    }

    /// Creates a manager from the `[cache]` config section
    pub fn from_config(source: Arc<dyn CatalogSource>, config: &CacheConfig) -> Self {
        Self::new(source, &config.categories).with_drain_size(config.drain_size)
    }

    /// Sets how many books [`CacheManager::consume`] hands out
    pub fn with_drain_size(mut self, drain_size: usize) -> Self {
        self.drain_size = drain_size;
        self
    }

    pub fn drain_size(&self) -> usize {
        self.drain_size
    }

    /// Configured category names, in order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|slot| slot.name.as_str())
    }

    fn slot(&self, category: &str) -> Option<&CategorySlot> {
        self.slots.iter().find(|slot| slot.name == category)
    }

    /// Fetches one batch for every category concurrently and replaces each queue
    ///
    /// All fetches run to completion; each category commits as soon as its own
    /// fetch returns. If any category fails, the first failing category in
    /// configured order is reported, while categories that succeeded keep
    /// their committed cursor and queue.
    pub async fn warm_up(&self, limit: u32) -> Result<WarmUpSummary, CacheError> {
        if limit == 0 {
            return Err(CacheError::InvalidLimit(limit.to_string()));
        }

        info!(limit, categories = self.slots.len(), "Warming cache");

        let fetches = self.slots.iter().map(|slot| async move {
            let outcome = self.warm_category(slot, limit).await;
            (slot.name.as_str(), outcome)
        });
        let outcomes = join_all(fetches).await;

        let mut summary = WarmUpSummary {
            limit,
            ..WarmUpSummary::default()
        };

        for (category, outcome) in outcomes {
            match outcome {
                Ok(0) => summary.empty.push(category.to_string()),
                Ok(count) => summary.warmed.push((category.to_string(), count)),
                Err(source) => {
                    warn!(category, error = %source, "Warm-up failed");
                    return Err(CacheError::UpstreamFetchFailed {
                        category: category.to_string(),
                        source,
                    });
                }
            }
        }

        info!(
            warmed = summary.warmed.len(),
            empty = summary.empty.len(),
            "Cache warm-up complete"
        );
        Ok(summary)
    }

    /// Fetches and commits one category's warm-up batch, returning the count stored
    async fn warm_category(&self, slot: &CategorySlot, limit: u32) -> Result<usize, CatalogError> {
        let mut state = slot.state.lock().await;

        let raw = self
            .source
            .fetch_subject(&slot.name, limit, state.cursor)
            .await?;
        let books = format_books(raw, limit as usize);

        if books.is_empty() {
            warn!(category = %slot.name, "No books returned while warming the cache");
            return Ok(0);
        }

        let count = books.len();
        state.cursor = state.cursor.saturating_add(limit);
        state.queue = Some(books);

        debug!(category = %slot.name, count, cursor = state.cursor, "Replaced cached books");
        Ok(count)
    }

    /// Fetches one more batch for an already-cached category and appends it
    ///
    /// # Returns
    /// * `Ok(ExtendOutcome::Appended)` - Books were appended; cursor advanced by `limit`
    /// * `Ok(ExtendOutcome::NoNewItems)` - The catalog returned nothing
    /// * `Err(CacheError::CategoryNotCached)` - No cache entry; nothing was fetched
    /// * `Err(CacheError::UpstreamFetchFailed)` - The catalog request failed
    pub async fn extend(&self, category: &str, limit: u32) -> Result<ExtendOutcome, CacheError> {
        if limit == 0 {
            return Err(CacheError::InvalidLimit(limit.to_string()));
        }

        let slot = self
            .slot(category)
            .ok_or_else(|| CacheError::CategoryNotCached(category.to_string()))?;
        let mut state = slot.state.lock().await;

        if state.queue.is_none() {
            return Err(CacheError::CategoryNotCached(category.to_string()));
        }

        let raw = self
            .source
            .fetch_subject(category, limit, state.cursor)
            .await
            .map_err(|source| {
                warn!(category, error = %source, "Extend failed");
                CacheError::UpstreamFetchFailed {
                    category: category.to_string(),
                    source,
                }
            })?;

        if raw.is_empty() {
            info!(category, cursor = state.cursor, "No new books to add");
            return Ok(ExtendOutcome::NoNewItems);
        }

        state.cursor = state.cursor.saturating_add(limit);

        let books = format_books(raw, limit as usize);
        let count = books.len();
        state.queue.get_or_insert_with(Vec::new).extend(books);

        debug!(category, count, cursor = state.cursor, "Appended cached books");
        Ok(ExtendOutcome::Appended { count })
    }

    /// Drains the configured number of books from a category
    pub async fn consume(&self, category: &str) -> Result<Vec<Book>, CacheError> {
        self.consume_batch(category, self.drain_size).await
    }

    /// Drains up to `batch_size` books from the tail of a category's queue
    ///
    /// With fewer than `batch_size` books queued, all of them are returned and
    /// the cache entry is removed. Otherwise the `batch_size` most recently
    /// appended books are returned, in queue order, and the older ones stay.
    pub async fn consume_batch(
        &self,
        category: &str,
        batch_size: usize,
    ) -> Result<Vec<Book>, CacheError> {
        if batch_size == 0 {
            return Err(CacheError::InvalidLimit(batch_size.to_string()));
        }

        let slot = self
            .slot(category)
            .ok_or_else(|| CacheError::NoCachedItems(category.to_string()))?;
        let mut state = slot.state.lock().await;

        let queued = state.queue.as_ref().map_or(0, Vec::len);
        if queued == 0 {
            return Err(CacheError::NoCachedItems(category.to_string()));
        }

        if queued < batch_size {
            debug!(category, count = queued, "Fully drained cached books");
            return Ok(state.queue.take().unwrap_or_default());
        }

        let drained = state
            .queue
            .as_mut()
            .map(|queue| queue.split_off(queued - batch_size))
            .unwrap_or_default();

        debug!(category, count = drained.len(), remaining = queued - batch_size, "Drained cached books");
        Ok(drained)
    }

    /// Current cursor of a category
    pub async fn cursor(&self, category: &str) -> Option<u32> {
        let slot = self.slot(category)?;
        Some(slot.state.lock().await.cursor)
    }

    /// Number of queued books; `None` when the category has no cache entry
    pub async fn queued(&self, category: &str) -> Option<usize> {
        let slot = self.slot(category)?;
        let state = slot.state.lock().await;
        state.queue.as_ref().map(Vec::len)
    }

    /// Cursor and queue length of every category, in configured order
    pub async fn snapshot(&self) -> Vec<CategorySnapshot> {
        let mut snapshot = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            let state = slot.state.lock().await;
            snapshot.push(CategorySnapshot {
                category: slot.name.clone(),
                cursor: state.cursor,
                queued: state.queue.as_ref().map(Vec::len),
            });
        }
        snapshot
    }
}
