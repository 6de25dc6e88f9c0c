//! Statistics tracking for pools

use core::sync::atomic::{AtomicU64, Ordering};

/// Counters for pool operations
#[derive(Debug, Default)]
pub struct PoolStats {
    allocations: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    creations: AtomicU64,
    frees: AtomicU64,
    discarded: AtomicU64,
    evicted: AtomicU64,
    reclaimed: AtomicU64,
}

impl PoolStats {
    pub(crate) fn record_hit(&self) {
        self.allocations.fetch_add(1, Ordering::Relaxed);
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.allocations.fetch_add(1, Ordering::Relaxed);
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_creation(&self) {
        self.creations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_free(&self) {
        self.frees.fetch_add(1, Ordering::Relaxed);
    }

    /// Instance refused on free because it was not reusable
    pub(crate) fn record_discard(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_eviction(&self) {
        self.evicted.fetch_add(1, Ordering::Relaxed);
    }

    /// Dead entries dropped from the pool
    pub(crate) fn record_reclaimed(&self, count: usize) {
        if count > 0 {
            self.reclaimed.fetch_add(count as u64, Ordering::Relaxed);
        }
    }

    /// Take a consistent-enough copy of the counters
    pub fn snapshot(&self) -> PoolStatsSnapshot {
        PoolStatsSnapshot {
            allocations: self.allocations.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            creations: self.creations.load(Ordering::Relaxed),
            frees: self.frees.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
            reclaimed: self.reclaimed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time pool statistics for monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStatsSnapshot {
    /// Total `allocate` calls
    pub allocations: u64,
    /// Allocations served from the pool
    pub hits: u64,
    /// Allocations that found no live entry
    pub misses: u64,
    /// Instances built by the factory (including pre-warm)
    pub creations: u64,
    /// Instances accepted back by `free`
    pub frees: u64,
    /// Instances refused by `free` as not reusable
    pub discarded: u64,
    /// Entries dropped because the pool was at capacity
    pub evicted: u64,
    /// Dead entries removed by allocation scans, `compact` or `reclaim`
    pub reclaimed: u64,
}

impl PoolStatsSnapshot {
    /// Calculate hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        if self.allocations == 0 {
            0.0
        } else {
            self.hits as f64 / self.allocations as f64
        }
    }
}
