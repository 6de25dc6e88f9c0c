//! Pool of uniformly constructed instances
//!
//! A `FixedPool` hands out instances that are always created the same way
//! (an empty list, a string builder, a hasher). Returned instances are reset
//! and kept in a FIFO of [`Reclaimable`] slots; slots that were reclaimed
//! while idle are skipped on allocation.

use std::collections::VecDeque;
use std::time::Instant;

use parking_lot::Mutex;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

use crate::config::PoolConfig;
use crate::error::PoolResult;
use crate::guard::{Pooled, Recycle};
use crate::poolable::Poolable;
use crate::reclaim::Reclaimable;
use crate::stats::{PoolStats, PoolStatsSnapshot};

/// Thread-safe pool of instances built by a zero-argument factory
///
/// # Example
/// ```
/// use nebula_pool::FixedPool;
///
/// let pool = FixedPool::new(Vec::<u32>::new);
///
/// let mut list = pool.allocate();
/// list.extend([1, 2, 3]);
/// pool.free(list);
///
/// // The same list comes back, emptied
/// let list = pool.allocate();
/// assert!(list.is_empty());
/// ```
pub struct FixedPool<T: Poolable> {
    entries: Mutex<VecDeque<Reclaimable<T>>>,
    factory: Box<dyn Fn() -> T + Send + Sync>,
    config: PoolConfig,
    stats: PoolStats,
}

impl<T: Poolable> FixedPool<T> {
    /// Create new pool with default configuration
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::build(PoolConfig::default(), Box::new(factory))
    }

    /// Create pool with custom configuration
    ///
    /// Pre-warms `config.initial_entries` instances.
    pub fn with_config<F>(config: PoolConfig, factory: F) -> PoolResult<Self>
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        config.validate()?;
        Ok(Self::build(config, Box::new(factory)))
    }

    fn build(config: PoolConfig, factory: Box<dyn Fn() -> T + Send + Sync>) -> Self {
        let now = Instant::now();
        let stats = PoolStats::default();
        let mut entries = VecDeque::with_capacity(config.initial_entries);
        for _ in 0..config.initial_entries {
            stats.record_creation();
            entries.push_back(Reclaimable::at(factory(), now));
        }

        #[cfg(feature = "logging")]
        debug!(
            pool = core::any::type_name::<T>(),
            max_entries = ?config.max_entries,
            max_idle = ?config.max_idle,
            prewarmed = config.initial_entries,
            "created fixed pool"
        );

        Self {
            entries: Mutex::new(entries),
            factory,
            config,
            stats,
        }
    }

    /// Take an instance from the pool, or create a new one
    ///
    /// Dead slots found at the head of the pool are removed on the way and
    /// dropped once the lock is released.
    pub fn allocate(&self) -> T {
        let now = Instant::now();
        let mut dead = Vec::new();
        let found = {
            let mut entries = self.entries.lock();
            let mut found = None;
            while let Some(mut slot) = entries.pop_front() {
                if slot.is_live(self.config.max_idle, now) {
                    found = slot.release();
                    break;
                }
                dead.push(slot);
            }
            found
        };
        self.stats.record_reclaimed(dead.len());
        drop(dead);

        if let Some(value) = found {
            self.stats.record_hit();
            value
        } else {
            self.stats.record_miss();
            self.stats.record_creation();
            (self.factory)()
        }
    }

    /// Return an instance so it can be reused
    ///
    /// The instance is reset before it becomes available again. Passing
    /// `None` is a no-op; instances that are no longer reusable are dropped.
    pub fn free<I>(&self, instance: I)
    where
        I: Into<Option<T>>,
    {
        let instance: Option<T> = instance.into();
        let Some(mut value) = instance else {
            return;
        };
        if !value.is_reusable() {
            self.stats.record_discard();
            return;
        }

        value.reset();
        self.stats.record_free();

        let evicted = {
            let mut entries = self.entries.lock();
            let evicted = match self.config.max_entries {
                Some(max) if entries.len() >= max => entries.pop_front(),
                _ => None,
            };
            entries.push_back(Reclaimable::new(value));
            evicted
        };

        if evicted.is_some() {
            self.stats.record_eviction();
            #[cfg(feature = "logging")]
            trace!(pool = core::any::type_name::<T>(), "evicted oldest pooled entry");
        }
    }

    /// Check out an instance behind an RAII guard
    pub fn get(&self) -> Pooled<'_, T> {
        Pooled::new(self.allocate(), self)
    }

    /// Run `function` with a pooled instance and return its result
    ///
    /// The instance is freed on every exit path, including an `Err` result
    /// and a panic unwinding out of `function`.
    pub fn for_instance<R, F>(&self, function: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut instance = self.get();
        function(&mut *instance)
    }

    /// Run `consumer` with a pooled instance
    pub fn for_instance_do<F>(&self, consumer: F)
    where
        F: FnOnce(&mut T),
    {
        self.for_instance(consumer);
    }

    /// Discard all pooled entries without resetting them
    pub fn reset(&self) {
        let drained = core::mem::take(&mut *self.entries.lock());
        drop(drained);
    }

    /// Number of pooled entries, including ones that may have been reclaimed
    pub fn size(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if the pool holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Remove reclaimed and expired entries
    ///
    /// Returns the number of entries removed.
    pub fn compact(&self) -> usize {
        let now = Instant::now();
        let dead = {
            let mut entries = self.entries.lock();
            let (live, dead): (VecDeque<_>, VecDeque<_>) = core::mem::take(&mut *entries)
                .into_iter()
                .partition(|slot| slot.is_live(self.config.max_idle, now));
            *entries = live;
            dead
        };

        let removed = dead.len();
        drop(dead);
        self.stats.record_reclaimed(removed);

        #[cfg(feature = "logging")]
        if removed > 0 {
            debug!(pool = core::any::type_name::<T>(), removed, "compacted fixed pool");
        }

        removed
    }

    /// Drop every pooled instance, as a collector would under memory pressure
    ///
    /// The emptied slots stay behind until the next `allocate` or `compact`.
    /// Returns the number of instances dropped.
    pub fn reclaim(&self) -> usize {
        let mut released = Vec::new();
        {
            let mut entries = self.entries.lock();
            released.extend(entries.iter_mut().filter_map(Reclaimable::release));
        }

        let count = released.len();
        drop(released);

        #[cfg(feature = "logging")]
        debug!(pool = core::any::type_name::<T>(), count, "reclaimed fixed pool");

        count
    }

    /// Get pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Get pool statistics
    pub fn stats(&self) -> PoolStatsSnapshot {
        self.stats.snapshot()
    }
}

impl<T: Poolable> Recycle<T> for FixedPool<T> {
    fn recycle(&self, value: T) {
        self.free(value);
    }
}

impl<T: Poolable> core::fmt::Debug for FixedPool<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FixedPool")
            .field("type", &core::any::type_name::<T>())
            .field("size", &self.size())
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}
