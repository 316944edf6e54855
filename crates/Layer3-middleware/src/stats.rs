//! Outcome counters for the caching handler

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of handler outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Responses replayed from the store
    pub hits: u64,
    /// Lookups that found nothing (handler ran, response recorded)
    pub misses: u64,
    /// Recorded responses written to the store
    pub stores: u64,
    /// Recorded responses that could not be stored
    pub store_failures: u64,
    /// Lookups that failed and fell back to the handler
    pub degrades: u64,
    /// Requests that skipped the cache (method or bypass)
    pub passthroughs: u64,
}

impl CacheStats {
    /// Hits over all lookups that reached a verdict
    #[inline]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }

    #[inline]
    pub fn requests(&self) -> u64 {
        self.hits + self.misses + self.degrades + self.passthroughs
    }
}

#[derive(Debug, Default)]
pub(crate) struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    stores: AtomicU64,
    store_failures: AtomicU64,
    degrades: AtomicU64,
    passthroughs: AtomicU64,
}

impl CacheCounters {
    pub(crate) fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn stored(&self) {
        self.stores.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn store_failed(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn degraded(&self) {
        self.degrades.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn passthrough(&self) {
        self.passthroughs.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
            degrades: self.degrades.load(Ordering::Relaxed),
            passthroughs: self.passthroughs.load(Ordering::Relaxed),
        }
    }
}
