//! Per-genre rolling cache of catalog results
//!
//! This module provides a cache manager that tracks a pagination cursor per
//! category, warms every category concurrently, extends single categories on
//! demand, and drains bounded batches so no book is served twice. All state is
//! in memory and lives only as long as the process.

mod manager;

pub use manager::{
    parse_limit, CacheError, CacheManager, CategorySnapshot, ExtendOutcome, WarmUpSummary,
    DEFAULT_DRAIN_SIZE,
};

#[cfg(test)]
pub(crate) mod testing;
