//! In-memory catalog double for cache and app tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Barrier;

use crate::data::{CatalogError, CatalogSource, RawVolume};

/// A single upstream request seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FetchCall {
    pub subject: String,
    pub limit: u32,
    pub start_index: u32,
}

/// Catalog where every subject is an endless run of volumes named
/// `"{subject}-{index}"`, unless capped, resized, or failed per subject.
#[derive(Default)]
pub(crate) struct MockCatalog {
    failures: Mutex<HashMap<String, u16>>,
    totals: HashMap<String, u32>,
    page_sizes: HashMap<String, u32>,
    calls: Mutex<Vec<FetchCall>>,
    barrier: Option<Barrier>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request for `subject` answers with `status`
    pub fn failing(self, subject: &str, status: u16) -> Self {
        self.fail(subject, status);
        self
    }

    /// The subject only has `total` volumes
    pub fn with_total(mut self, subject: &str, total: u32) -> Self {
        self.totals.insert(subject.to_string(), total);
        self
    }

    /// Pages for `subject` hold `size` volumes whatever limit is asked for
    pub fn with_page_size(mut self, subject: &str, size: u32) -> Self {
        self.page_sizes.insert(subject.to_string(), size);
        self
    }

    /// Requests block until `parties` of them are in flight together
    pub fn with_barrier(mut self, parties: usize) -> Self {
        self.barrier = Some(Barrier::new(parties));
        self
    }

    pub fn fail(&self, subject: &str, status: u16) {
        self.failures
            .lock()
            .unwrap()
            .insert(subject.to_string(), status);
    }

    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, subject: &str) -> usize {
        self.calls().iter().filter(|c| c.subject == subject).count()
    }
}

/// A raw volume with an id and matching title
pub(crate) fn volume(id: &str) -> RawVolume {
    serde_json::from_value(json!({ "id": id, "volumeInfo": { "title": format!("Title {}", id) } }))
        .unwrap()
}

#[async_trait]
impl CatalogSource for MockCatalog {
    async fn fetch_subject(
        &self,
        subject: &str,
        limit: u32,
        start_index: u32,
    ) -> Result<Vec<RawVolume>, CatalogError> {
        self.calls.lock().unwrap().push(FetchCall {
            subject: subject.to_string(),
            limit,
            start_index,
        });

        if let Some(ref barrier) = self.barrier {
            barrier.wait().await;
        }

        let failure = self.failures.lock().unwrap().get(subject).copied();
        if let Some(status) = failure {
            return Err(CatalogError::Status(status));
        }

        let page = self.page_sizes.get(subject).copied().unwrap_or(limit);
        let total = self.totals.get(subject).copied().unwrap_or(u32::MAX);
        let end = start_index.saturating_add(page).min(total);

        Ok((start_index..end)
            .map(|i| volume(&format!("{}-{}", subject, i)))
            .collect())
    }
}
