//! Reclaimable object and buffer pools for Nebula workflow automation
//!
//! This crate recycles short-lived helper objects (lists, maps, string
//! builders, hashers) and scratch buffers instead of allocating them for
//! every operation:
//!
//! - [`FixedPool`] - instances from a zero-argument factory, reused FIFO
//! - [`SizedPool`] - buffers ordered by length, served by size class
//! - [`PoolRegistry`] - one lazily created pool per logical [`PoolKind`]
//!
//! Pooled instances sit in [`Reclaimable`] slots: a slot may lose its
//! instance while idle (idle expiry, an explicit `reclaim` sweep, or the
//! entry cap), and pools silently skip such slots. A miss never fails; a
//! fresh instance is created instead.
//!
//! # Features
//!
//! - `logging` (default): Emit `tracing` events for pool lifecycle
//! - `serde`: Serialize and deserialize [`PoolConfig`]
//!
//! # Example
//!
//! ```
//! use nebula_pool::global;
//!
//! # fn main() -> nebula_pool::PoolResult<()> {
//! let lists = global().lists::<u32>()?;
//!
//! let total: u32 = lists.for_instance(|list| {
//!     list.extend([1, 2, 3]);
//!     list.iter().sum()
//! });
//! assert_eq!(total, 6);
//!
//! // The list went back to the pool, emptied
//! assert!(lists.allocate().is_empty());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod checksum;
pub mod config;
pub mod error;
pub mod fixed;
mod guard;
pub mod io;
pub mod poolable;
pub mod reclaim;
pub mod registry;
pub mod size_class;
pub mod sized;
pub mod stats;

pub use config::PoolConfig;
pub use error::{PoolError, PoolResult};
pub use fixed::FixedPool;
pub use guard::Pooled;
pub use poolable::{Poolable, SizedPoolable};
pub use reclaim::Reclaimable;
pub use registry::{ElementType, ManagedPool, PoolKind, PoolRegistry, global};
pub use size_class::size_class;
pub use sized::SizedPool;
pub use stats::{PoolStats, PoolStatsSnapshot};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::PoolConfig;
    pub use crate::error::{PoolError, PoolResult};
    pub use crate::fixed::FixedPool;
    pub use crate::guard::Pooled;
    pub use crate::poolable::{Poolable, SizedPoolable};
    pub use crate::registry::{ManagedPool, PoolKind, PoolRegistry, global};
    pub use crate::sized::SizedPool;
}
