//! Process-wide registry of pools keyed by logical kind
//!
//! Each [`PoolKind`] maps to at most one pool. Pools are created lazily on
//! first access and live as long as the registry; the [`global`] registry is
//! never torn down.

use core::any::{Any, TypeId};
use core::fmt;
use core::hash::{Hash, Hasher};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use bytes::BytesMut;
use dashmap::DashMap;
use parking_lot::Mutex;

#[cfg(feature = "logging")]
use tracing::debug;

use crate::config::PoolConfig;
use crate::error::{PoolError, PoolResult};
use crate::fixed::FixedPool;
use crate::poolable::{Poolable, SizedPoolable};
use crate::sized::SizedPool;
use crate::stats::PoolStatsSnapshot;

/// Element type of a collection pool, compared by [`TypeId`]
#[derive(Clone, Copy)]
pub struct ElementType {
    id: TypeId,
    name: &'static str,
}

impl ElementType {
    /// Element type for `T`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: core::any::type_name::<T>(),
        }
    }

    /// Type name, for diagnostics only
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ElementType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ElementType {}

impl Hash for ElementType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Logical key of a registered pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PoolKind {
    /// Lists of one element type
    List(ElementType),
    /// Maps of one key/value pair type
    Map(ElementType),
    /// Reusable string builders
    StringBuilder,
    /// Byte buffers ordered by length
    ByteBuffer,
    /// Char buffers ordered by length
    CharBuffer,
    /// Growable byte output streams
    ByteStream,
    /// Message digests of one algorithm
    Checksum(ElementType),
    /// Application-defined pool
    Custom(&'static str),
}

impl PoolKind {
    /// List pool for elements of type `T`
    pub fn list<T: 'static>() -> Self {
        Self::List(ElementType::of::<T>())
    }

    /// Map pool for keys `K` and values `V`
    pub fn map<K: 'static, V: 'static>() -> Self {
        Self::Map(ElementType::of::<(K, V)>())
    }

    /// Digest pool for hasher type `D`
    pub fn checksum<D: 'static>() -> Self {
        Self::Checksum(ElementType::of::<D>())
    }
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List(element) => write!(f, "list<{}>", element.name()),
            Self::Map(element) => write!(f, "map<{}>", element.name()),
            Self::StringBuilder => f.write_str("string-builder"),
            Self::ByteBuffer => f.write_str("byte-buffer"),
            Self::CharBuffer => f.write_str("char-buffer"),
            Self::ByteStream => f.write_str("byte-stream"),
            Self::Checksum(hasher) => write!(f, "checksum<{}>", hasher.name()),
            Self::Custom(name) => write!(f, "custom:{name}"),
        }
    }
}

/// Maintenance operations shared by every pool type
pub trait ManagedPool: Send + Sync {
    /// Number of pooled entries, dead ones included
    fn size(&self) -> usize;

    /// Discard all pooled entries
    fn reset(&self);

    /// Remove dead entries, returning how many were removed
    fn compact(&self) -> usize;

    /// Drop every pooled instance, returning how many were dropped
    fn reclaim(&self) -> usize;

    /// Current statistics
    fn stats(&self) -> PoolStatsSnapshot;
}

impl<T: Poolable> ManagedPool for FixedPool<T> {
    fn size(&self) -> usize {
        Self::size(self)
    }

    fn reset(&self) {
        Self::reset(self);
    }

    fn compact(&self) -> usize {
        Self::compact(self)
    }

    fn reclaim(&self) -> usize {
        Self::reclaim(self)
    }

    fn stats(&self) -> PoolStatsSnapshot {
        Self::stats(self)
    }
}

impl<T: SizedPoolable> ManagedPool for SizedPool<T> {
    fn size(&self) -> usize {
        Self::size(self)
    }

    fn reset(&self) {
        Self::reset(self);
    }

    fn compact(&self) -> usize {
        Self::compact(self)
    }

    fn reclaim(&self) -> usize {
        Self::reclaim(self)
    }

    fn stats(&self) -> PoolStatsSnapshot {
        Self::stats(self)
    }
}

#[derive(Clone)]
struct RegisteredPool {
    any: Arc<dyn Any + Send + Sync>,
    managed: Arc<dyn ManagedPool>,
}

/// Per-kind cell, initialized outside any map shard lock
#[derive(Default)]
struct PoolSlot {
    pool: OnceLock<RegisteredPool>,
    /// Serializes initializers of this kind only
    init: Mutex<()>,
}

impl PoolSlot {
    fn managed(&self) -> Option<Arc<dyn ManagedPool>> {
        self.pool.get().map(|registered| registered.managed.clone())
    }
}

/// Thread-safe map from [`PoolKind`] to pool
///
/// # Example
/// ```
/// use nebula_pool::PoolRegistry;
///
/// let registry = PoolRegistry::new();
/// let buffers = registry.byte_buffers().unwrap();
///
/// let buf = buffers.allocate(100);
/// assert!(buf.capacity() >= 100);
/// buffers.free(buf);
///
/// assert!(std::sync::Arc::ptr_eq(&buffers, &registry.byte_buffers().unwrap()));
/// ```
pub struct PoolRegistry {
    config: PoolConfig,
    pools: DashMap<PoolKind, Arc<PoolSlot>>,
}

impl PoolRegistry {
    /// Create an empty registry whose pools use the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PoolConfig::default(),
            pools: DashMap::new(),
        }
    }

    /// Create an empty registry whose built-in pools use `config`
    pub fn with_config(config: PoolConfig) -> PoolResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            pools: DashMap::new(),
        })
    }

    /// Configuration applied to pools created by the typed accessors
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Get the pool registered for `kind`, creating it with `init` if absent
    ///
    /// Creation is atomic: concurrent callers for the same kind all receive
    /// the same pool and a successful `init` runs at most once. `init` runs
    /// without holding any registry-wide lock, so it may register other
    /// kinds; registering its own kind from inside `init` deadlocks. Fails
    /// if `kind` is already registered with a pool of a different type.
    pub fn get_or_init<P, F>(&self, kind: PoolKind, init: F) -> PoolResult<Arc<P>>
    where
        P: ManagedPool + 'static,
        F: FnOnce() -> PoolResult<P>,
    {
        let existing = self.pools.get(&kind).map(|entry| Arc::clone(entry.value()));
        let slot = existing
            .unwrap_or_else(|| Arc::clone(self.pools.entry(kind).or_default().value()));

        let registered = match slot.pool.get() {
            Some(registered) => registered.clone(),
            None => {
                let _initializing = slot.init.lock();
                match slot.pool.get() {
                    Some(registered) => registered.clone(),
                    None => {
                        let pool = Arc::new(init()?);

                        #[cfg(feature = "logging")]
                        debug!(%kind, pool = core::any::type_name::<P>(), "registered pool");

                        slot.pool
                            .get_or_init(|| RegisteredPool {
                                any: pool.clone(),
                                managed: pool,
                            })
                            .clone()
                    }
                }
            }
        };

        registered
            .any
            .downcast::<P>()
            .map_err(|_| PoolError::kind_mismatch(kind, core::any::type_name::<P>()))
    }

    /// Look up the pool registered for `kind` without creating one
    pub fn get(&self, kind: PoolKind) -> Option<Arc<dyn ManagedPool>> {
        self.pools.get(&kind).and_then(|entry| entry.managed())
    }

    /// Check if a pool is registered for `kind`
    #[must_use]
    pub fn contains(&self, kind: PoolKind) -> bool {
        self.pools
            .get(&kind)
            .is_some_and(|entry| entry.pool.get().is_some())
    }

    /// Pool of lists with elements of type `T`
    pub fn lists<T: Send + 'static>(&self) -> PoolResult<Arc<FixedPool<Vec<T>>>> {
        self.get_or_init(PoolKind::list::<T>(), || {
            FixedPool::with_config(self.config.clone(), Vec::new)
        })
    }

    /// Pool of maps from `K` to `V`
    pub fn maps<K, V>(&self) -> PoolResult<Arc<FixedPool<HashMap<K, V>>>>
    where
        K: Send + 'static,
        V: Send + 'static,
    {
        self.get_or_init(PoolKind::map::<K, V>(), || {
            FixedPool::with_config(self.config.clone(), HashMap::new)
        })
    }

    /// Pool of string builders
    pub fn string_builders(&self) -> PoolResult<Arc<FixedPool<String>>> {
        self.get_or_init(PoolKind::StringBuilder, || {
            FixedPool::with_config(self.config.clone(), String::new)
        })
    }

    /// Pool of byte buffers ordered by capacity
    pub fn byte_buffers(&self) -> PoolResult<Arc<SizedPool<Vec<u8>>>> {
        self.get_or_init(PoolKind::ByteBuffer, || {
            SizedPool::with_config(self.config.clone())
        })
    }

    /// Pool of char buffers ordered by capacity
    pub fn char_buffers(&self) -> PoolResult<Arc<SizedPool<Vec<char>>>> {
        self.get_or_init(PoolKind::CharBuffer, || {
            SizedPool::with_config(self.config.clone())
        })
    }

    /// Pool of growable byte output streams
    pub fn byte_streams(&self) -> PoolResult<Arc<FixedPool<BytesMut>>> {
        self.get_or_init(PoolKind::ByteStream, || {
            FixedPool::with_config(self.config.clone(), BytesMut::new)
        })
    }

    /// Pool of hashers for digest algorithm `D`, such as `sha2::Sha512`
    pub fn checksums<D>(&self) -> PoolResult<Arc<FixedPool<D>>>
    where
        D: Poolable + Default,
    {
        self.get_or_init(PoolKind::checksum::<D>(), || {
            FixedPool::with_config(self.config.clone(), D::default)
        })
    }

    /// Kinds of all registered pools
    #[must_use]
    pub fn kinds(&self) -> Vec<PoolKind> {
        self.pools
            .iter()
            .filter(|entry| entry.pool.get().is_some())
            .map(|entry| *entry.key())
            .collect()
    }

    /// Number of registered pools
    #[must_use]
    pub fn len(&self) -> usize {
        self.pools
            .iter()
            .filter(|entry| entry.pool.get().is_some())
            .count()
    }

    /// Whether no pool has been registered yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compact every registered pool, returning the total entries removed
    pub fn compact_all(&self) -> usize {
        self.managed().iter().map(|pool| pool.compact()).sum()
    }

    /// Reclaim every registered pool, returning the total instances dropped
    pub fn reclaim_all(&self) -> usize {
        let dropped = self.managed().iter().map(|pool| pool.reclaim()).sum();

        #[cfg(feature = "logging")]
        debug!(pools = self.len(), dropped, "reclaimed all pools");

        dropped
    }

    /// Reset every registered pool
    pub fn reset_all(&self) {
        for pool in self.managed() {
            pool.reset();
        }
    }

    /// Statistics of every registered pool
    #[must_use]
    pub fn stats(&self) -> Vec<(PoolKind, PoolStatsSnapshot)> {
        self.pools
            .iter()
            .filter_map(|entry| Some((*entry.key(), entry.managed()?.stats())))
            .collect()
    }

    /// Snapshot of the registered pools, so maintenance runs without
    /// holding shard locks
    fn managed(&self) -> Vec<Arc<dyn ManagedPool>> {
        self.pools.iter().filter_map(|entry| entry.managed()).collect()
    }
}

impl Default for PoolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PoolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolRegistry")
            .field("config", &self.config)
            .field("kinds", &self.kinds())
            .finish()
    }
}

/// Process-wide registry, created on first use with the default configuration
pub fn global() -> &'static PoolRegistry {
    static GLOBAL: OnceLock<PoolRegistry> = OnceLock::new();
    GLOBAL.get_or_init(PoolRegistry::new)
}
