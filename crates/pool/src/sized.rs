//! Pool of variable-length instances ordered by length
//!
//! Pooled entries are kept in a single vector sorted by ascending length.
//! A request for `size` is served by the shortest live entry that is at
//! least `size` long. On a miss the new instance is created at the
//! [size class](crate::size_class) of `size`.

use core::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

use crate::config::PoolConfig;
use crate::error::PoolResult;
use crate::guard::{Pooled, Recycle};
use crate::poolable::SizedPoolable;
use crate::reclaim::Reclaimable;
use crate::size_class::size_class;
use crate::stats::{PoolStats, PoolStatsSnapshot};

#[derive(Debug)]
struct SizedEntry<T> {
    length: usize,
    /// Insertion order, used to pick the oldest entry for eviction
    sequence: u64,
    slot: Reclaimable<T>,
}

/// Thread-safe pool of buffers keyed by length
///
/// # Example
/// ```
/// use nebula_pool::SizedPool;
///
/// let pool = SizedPool::<Vec<u8>>::new();
///
/// let buf = pool.allocate(600);
/// assert!(buf.capacity() >= 600);
/// pool.free(buf);
///
/// // Any request that fits in the pooled buffer reuses it
/// let buf = pool.allocate(100);
/// assert!(buf.capacity() >= 1024);
/// ```
pub struct SizedPool<T: SizedPoolable> {
    entries: Mutex<Vec<SizedEntry<T>>>,
    create: Box<dyn Fn(usize) -> T + Send + Sync>,
    config: PoolConfig,
    stats: PoolStats,
    sequence: AtomicU64,
}

impl<T: SizedPoolable> SizedPool<T> {
    /// Create new pool with default configuration
    pub fn new() -> Self {
        Self::build(PoolConfig::default(), Box::new(T::with_length))
    }

    /// Create pool with custom configuration
    pub fn with_config(config: PoolConfig) -> PoolResult<Self> {
        Self::with_factory(config, T::with_length)
    }

    /// Create pool with custom configuration and factory
    ///
    /// `create` receives the quantized size class and must return an
    /// instance at least that long. `initial_entries` are pre-warmed at the
    /// smallest class.
    pub fn with_factory<F>(config: PoolConfig, create: F) -> PoolResult<Self>
    where
        F: Fn(usize) -> T + Send + Sync + 'static,
    {
        config.validate()?;
        Ok(Self::build(config, Box::new(create)))
    }

    fn build(config: PoolConfig, create: Box<dyn Fn(usize) -> T + Send + Sync>) -> Self {
        let now = Instant::now();
        let stats = PoolStats::default();
        let mut entries = Vec::with_capacity(config.initial_entries);
        for sequence in 0..config.initial_entries as u64 {
            stats.record_creation();
            let value = create(size_class(0));
            entries.push(SizedEntry {
                length: value.length(),
                sequence,
                slot: Reclaimable::at(value, now),
            });
        }
        entries.sort_by_key(|entry| entry.length);

        #[cfg(feature = "logging")]
        debug!(
            pool = core::any::type_name::<T>(),
            max_entries = ?config.max_entries,
            max_idle = ?config.max_idle,
            prewarmed = config.initial_entries,
            "created sized pool"
        );

        Self {
            entries: Mutex::new(entries),
            create,
            sequence: AtomicU64::new(config.initial_entries as u64),
            config,
            stats,
        }
    }

    /// Take an instance at least `size` long, or create a new one
    ///
    /// Pooled entries are matched against `size` itself; only new instances
    /// are created at the size class of `size`. Dead entries passed over
    /// during the search stay in place until [`compact`](Self::compact).
    pub fn allocate(&self, size: usize) -> T {
        let now = Instant::now();
        let found = {
            let mut entries = self.entries.lock();
            let start = entries.partition_point(|entry| entry.length < size);
            let position = entries[start..]
                .iter()
                .position(|entry| entry.slot.is_live(self.config.max_idle, now))
                .map(|offset| start + offset);
            position.and_then(|index| entries.remove(index).slot.release())
        };

        if let Some(value) = found {
            self.stats.record_hit();
            value
        } else {
            self.stats.record_miss();
            self.stats.record_creation();
            (self.create)(size_class(size))
        }
    }

    /// Return an instance so it can be reused
    ///
    /// The instance is reset and inserted after any pooled entries of the
    /// same length. Passing `None` is a no-op; instances that are no longer
    /// reusable are dropped.
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
        let length = value.length();
        self.stats.record_free();

        let evicted = {
            let mut entries = self.entries.lock();
            let oldest = match self.config.max_entries {
                Some(max) if entries.len() >= max => entries
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, entry)| entry.sequence)
                    .map(|(index, _)| index),
                _ => None,
            };
            let evicted = oldest.map(|index| entries.remove(index));
            let index = entries.partition_point(|entry| entry.length <= length);
            entries.insert(
                index,
                SizedEntry {
                    length,
                    sequence: self.sequence.fetch_add(1, Ordering::Relaxed),
                    slot: Reclaimable::new(value),
                },
            );
            evicted
        };

        if let Some(evicted) = evicted {
            self.stats.record_eviction();
            #[cfg(feature = "logging")]
            trace!(
                pool = core::any::type_name::<T>(),
                length = evicted.length,
                "evicted oldest pooled entry"
            );
            drop(evicted);
        }
    }

    /// Check out an instance at least `size` long behind an RAII guard
    pub fn get(&self, size: usize) -> Pooled<'_, T> {
        Pooled::new(self.allocate(size), self)
    }

    /// Run `function` with a pooled instance at least `size` long
    ///
    /// The instance is freed on every exit path, including an `Err` result
    /// and a panic unwinding out of `function`.
    pub fn for_instance<R, F>(&self, size: usize, function: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut instance = self.get(size);
        function(&mut *instance)
    }

    /// Run `consumer` with a pooled instance at least `size` long
    pub fn for_instance_do<F>(&self, size: usize, consumer: F)
    where
        F: FnOnce(&mut T),
    {
        self.for_instance(size, consumer);
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

    /// Lengths of all pooled entries in pool order
    pub fn pooled_lengths(&self) -> Vec<usize> {
        self.entries.lock().iter().map(|entry| entry.length).collect()
    }

    /// Remove reclaimed and expired entries
    ///
    /// Order of the remaining entries is preserved. Returns the number of
    /// entries removed.
    pub fn compact(&self) -> usize {
        let now = Instant::now();
        let dead = {
            let mut entries = self.entries.lock();
            let (live, dead): (Vec<_>, Vec<_>) = core::mem::take(&mut *entries)
                .into_iter()
                .partition(|entry| entry.slot.is_live(self.config.max_idle, now));
            *entries = live;
            dead
        };

        let removed = dead.len();
        drop(dead);
        self.stats.record_reclaimed(removed);

        #[cfg(feature = "logging")]
        if removed > 0 {
            debug!(pool = core::any::type_name::<T>(), removed, "compacted sized pool");
        }

        removed
    }

    /// Drop every pooled instance, as a collector would under memory pressure
    ///
    /// The emptied slots stay behind until [`compact`](Self::compact).
    /// Returns the number of instances dropped.
    pub fn reclaim(&self) -> usize {
        let mut released = Vec::new();
        {
            let mut entries = self.entries.lock();
            released.extend(entries.iter_mut().filter_map(|entry| entry.slot.release()));
        }

        let count = released.len();
        drop(released);

        #[cfg(feature = "logging")]
        debug!(pool = core::any::type_name::<T>(), count, "reclaimed sized pool");

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

impl<T: SizedPoolable> Default for SizedPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SizedPoolable> Recycle<T> for SizedPool<T> {
    fn recycle(&self, value: T) {
        self.free(value);
    }
}

impl<T: SizedPoolable> core::fmt::Debug for SizedPool<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SizedPool")
            .field("type", &core::any::type_name::<T>())
            .field("size", &self.size())
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}
