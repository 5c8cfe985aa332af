//! Load statistics tracking

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters describing how loads were satisfied
#[derive(Debug, Default)]
pub struct LoadStats {
    store_hits: AtomicU64,
    store_misses: AtomicU64,
    registry_joins: AtomicU64,
    fetches: AtomicU64,
    fallbacks: AtomicU64,
    store_errors: AtomicU64,
}

impl LoadStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a load answered by the durable store
    pub fn record_store_hit(&self) {
        self.store_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a load that missed the durable store
    pub fn record_store_miss(&self) {
        self.store_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a load that joined an already registered request
    pub fn record_registry_join(&self) {
        self.registry_joins.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a network request
    pub fn record_fetch(&self) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a fetch that degraded to the fallback artifact
    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a swallowed store read or write failure
    pub fn record_store_error(&self) {
        self.store_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total store hits
    pub fn store_hits(&self) -> u64 {
        self.store_hits.load(Ordering::Relaxed)
    }

    /// Get total store misses
    pub fn store_misses(&self) -> u64 {
        self.store_misses.load(Ordering::Relaxed)
    }

    /// Get total registry joins
    pub fn registry_joins(&self) -> u64 {
        self.registry_joins.load(Ordering::Relaxed)
    }

    /// Get total network requests
    pub fn fetches(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Get total fallbacks
    pub fn fallbacks(&self) -> u64 {
        self.fallbacks.load(Ordering::Relaxed)
    }

    /// Get total swallowed store errors
    pub fn store_errors(&self) -> u64 {
        self.store_errors.load(Ordering::Relaxed)
    }

    /// Calculate store hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let hits = self.store_hits();
        let total = hits + self.store_misses();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    /// Reset all statistics
    pub fn reset(&self) {
        self.store_hits.store(0, Ordering::Relaxed);
        self.store_misses.store(0, Ordering::Relaxed);
        self.registry_joins.store(0, Ordering::Relaxed);
        self.fetches.store(0, Ordering::Relaxed);
        self.fallbacks.store(0, Ordering::Relaxed);
        self.store_errors.store(0, Ordering::Relaxed);
    }
}
