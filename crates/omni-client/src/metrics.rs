//! Global atomic counters for tooling client observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters; no allocations, no locking.
pub struct Metrics {
    fetches_started: AtomicU64,
    fetch_failures: AtomicU64,
    participants_fetched: AtomicU64,
    roots_deduplicated: AtomicU64,
    cache_hits: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            fetches_started: AtomicU64::new(0),
            fetch_failures: AtomicU64::new(0),
            participants_fetched: AtomicU64::new(0),
            roots_deduplicated: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
        }
    }

    pub fn inc_fetches_started(&self) {
        self.fetches_started.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "fetches_started", "counter incremented");
    }

    pub fn inc_fetch_failures(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "fetch_failures", "counter incremented");
    }

    pub fn inc_participants_fetched(&self) {
        self.participants_fetched.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "participants_fetched", "counter incremented");
    }

    pub fn inc_roots_deduplicated(&self) {
        self.roots_deduplicated.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "roots_deduplicated", "counter incremented");
    }

    pub fn inc_cache_hits(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "cache_hits", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            fetches_started = self.fetches_started(),
            fetch_failures = self.fetch_failures(),
            participants_fetched = self.participants_fetched(),
            roots_deduplicated = self.roots_deduplicated(),
            cache_hits = self.cache_hits(),
        );
    }

    pub fn fetches_started(&self) -> u64 {
        self.fetches_started.load(Ordering::Relaxed)
    }

    pub fn fetch_failures(&self) -> u64 {
        self.fetch_failures.load(Ordering::Relaxed)
    }

    pub fn participants_fetched(&self) -> u64 {
        self.participants_fetched.load(Ordering::Relaxed)
    }

    pub fn roots_deduplicated(&self) -> u64 {
        self.roots_deduplicated.load(Ordering::Relaxed)
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }
}
