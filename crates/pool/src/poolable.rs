//! Traits for objects that can be pooled

use std::collections::{BTreeMap, HashMap, VecDeque};

use bytes::BytesMut;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

/// Trait for objects that can be pooled
///
/// # Example
/// ```
/// use nebula_pool::Poolable;
///
/// struct Frame {
///     header: Vec<u8>,
///     payload: Vec<u8>,
/// }
///
/// impl Poolable for Frame {
///     fn reset(&mut self) {
///         self.header.clear();
///         self.payload.clear();
///     }
///
///     fn is_reusable(&self) -> bool {
///         self.payload.capacity() < 1_000_000 // Don't retain huge frames
///     }
/// }
/// ```
pub trait Poolable: Send + 'static {
    /// Reset object to its empty state
    ///
    /// Called when an object is returned to the pool. Content must become
    /// invisible to the next caller; capacity should be kept.
    fn reset(&mut self);

    /// Check if object is worth retaining
    ///
    /// Return false if the object should be discarded instead of pooled.
    fn is_reusable(&self) -> bool {
        true
    }

    /// Get approximate memory usage in bytes
    fn memory_usage(&self) -> usize {
        core::mem::size_of_val(self)
    }
}

/// Variable-length instances managed by a [`SizedPool`](crate::SizedPool)
pub trait SizedPoolable: Poolable {
    /// Create an instance whose [`length`](Self::length) is at least `length`
    fn with_length(length: usize) -> Self;

    /// Length used to order pooled instances
    ///
    /// For growable buffers this is the capacity, not the number of
    /// initialised elements.
    fn length(&self) -> usize;
}

impl Poolable for String {
    fn reset(&mut self) {
        self.clear();
    }

    fn is_reusable(&self) -> bool {
        // Don't pool strings with huge capacity
        self.capacity() < 1_000_000
    }

    fn memory_usage(&self) -> usize {
        core::mem::size_of::<Self>() + self.capacity()
    }
}

impl SizedPoolable for String {
    fn with_length(length: usize) -> Self {
        Self::with_capacity(length)
    }

    fn length(&self) -> usize {
        self.capacity()
    }
}

impl<T: Send + 'static> Poolable for Vec<T> {
    fn reset(&mut self) {
        self.clear();
    }

    fn is_reusable(&self) -> bool {
        self.capacity().saturating_mul(core::mem::size_of::<T>()) < 10_000_000
    }

    fn memory_usage(&self) -> usize {
        core::mem::size_of::<Self>() + self.capacity() * core::mem::size_of::<T>()
    }
}

impl<T: Send + 'static> SizedPoolable for Vec<T> {
    fn with_length(length: usize) -> Self {
        Self::with_capacity(length)
    }

    fn length(&self) -> usize {
        self.capacity()
    }
}

impl<T: Send + 'static> Poolable for VecDeque<T> {
    fn reset(&mut self) {
        self.clear();
    }

    fn is_reusable(&self) -> bool {
        self.capacity() < 100_000
    }

    fn memory_usage(&self) -> usize {
        core::mem::size_of::<Self>() + self.capacity() * core::mem::size_of::<T>()
    }
}

impl<K, V, S> Poolable for HashMap<K, V, S>
where
    K: Send + 'static,
    V: Send + 'static,
    S: Send + 'static,
{
    fn reset(&mut self) {
        self.clear();
    }

    fn is_reusable(&self) -> bool {
        self.capacity() < 10_000
    }

    fn memory_usage(&self) -> usize {
        // Approximate - HashMap overhead is complex
        core::mem::size_of::<Self>()
            + self.capacity() * (core::mem::size_of::<K>() + core::mem::size_of::<V>() + 16)
    }
}

impl<K: Send + 'static, V: Send + 'static> Poolable for BTreeMap<K, V> {
    fn reset(&mut self) {
        self.clear();
    }
}

impl Poolable for BytesMut {
    fn reset(&mut self) {
        self.clear();
    }

    fn is_reusable(&self) -> bool {
        self.capacity() < 10_000_000
    }

    fn memory_usage(&self) -> usize {
        core::mem::size_of::<Self>() + self.capacity()
    }
}

impl SizedPoolable for BytesMut {
    fn with_length(length: usize) -> Self {
        Self::with_capacity(length)
    }

    fn length(&self) -> usize {
        self.capacity()
    }
}

macro_rules! impl_poolable_digest {
    ($($hasher:ty),+ $(,)?) => {
        $(
            impl Poolable for $hasher {
                fn reset(&mut self) {
                    Digest::reset(self);
                }
            }
        )+
    };
}

impl_poolable_digest!(Sha224, Sha256, Sha384, Sha512);

/// Macro to implement Poolable for simple types
#[macro_export]
macro_rules! impl_poolable {
    ($type:ty, $reset:expr) => {
        impl $crate::Poolable for $type {
            fn reset(&mut self) {
                $reset(self);
            }
        }
    };

    ($type:ty, $reset:expr, $reusable:expr) => {
        impl $crate::Poolable for $type {
            fn reset(&mut self) {
                $reset(self);
            }

            fn is_reusable(&self) -> bool {
                $reusable(self)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_poolable() {
        let mut s = String::from("hello world");
        assert!(s.is_reusable());

        s.reset();
        assert_eq!(s, "");
        assert!(s.capacity() > 0); // Capacity is preserved
    }

    #[test]
    fn test_vec_poolable() {
        let mut v = vec![1, 2, 3, 4, 5];
        let cap = v.capacity();

        v.reset();
        assert!(v.is_empty());
        assert_eq!(v.capacity(), cap);
        assert_eq!(v.length(), cap);
    }

    #[test]
    fn test_large_vec_not_reusable() {
        let mut v = Vec::with_capacity(10_000_001);
        v.push(1u8);
        assert!(!v.is_reusable());
    }

    #[test]
    fn test_bytes_mut_keeps_capacity() {
        let mut buf = BytesMut::with_length(1024);
        buf.extend_from_slice(b"payload");
        buf.reset();
        assert!(buf.is_empty());
        assert!(buf.length() >= 1024);
    }

    #[test]
    fn test_sha256_reset_restarts_digest() {
        let mut hasher = Sha256::new();
        hasher.update(b"garbage");
        Poolable::reset(&mut hasher);
        hasher.update(b"abc");

        let mut fresh = Sha256::new();
        fresh.update(b"abc");
        assert_eq!(hasher.finalize(), fresh.finalize());
    }

    #[test]
    fn test_sha512_reset_restarts_digest() {
        let mut hasher = Sha512::new();
        hasher.update(b"garbage");
        Poolable::reset(&mut hasher);
        assert_eq!(hasher.finalize(), Sha512::new().finalize());
    }

    struct Counter(u32);

    impl_poolable!(Counter, |c: &mut Counter| c.0 = 0, |c: &Counter| c.0 < 10);

    #[test]
    fn test_impl_poolable_macro() {
        let mut c = Counter(7);
        assert!(c.is_reusable());
        c.reset();
        assert_eq!(c.0, 0);
        assert!(!Counter(11).is_reusable());
    }
}
