//! RAII guard for checked-out instances

use core::fmt;
use core::ops::{Deref, DerefMut};

/// Pools that accept instances back from a [`Pooled`] guard
pub(crate) trait Recycle<T>: Send + Sync {
    fn recycle(&self, value: T);
}

/// RAII wrapper for a checked-out instance
///
/// The instance goes back to its pool when the guard is dropped, including
/// when a panic unwinds through the scope holding it.
pub struct Pooled<'a, T> {
    value: Option<T>,
    pool: &'a dyn Recycle<T>,
}

impl<'a, T> Pooled<'a, T> {
    pub(crate) fn new(value: T, pool: &'a dyn Recycle<T>) -> Self {
        Self {
            value: Some(value),
            pool,
        }
    }

    /// Detach value from pool (won't be returned)
    pub fn detach(mut self) -> T {
        match self.value.take() {
            Some(value) => value,
            None => unreachable!("pooled value is only taken by detach or drop"),
        }
    }
}

impl<T> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        match &self.value {
            Some(value) => value,
            None => unreachable!("pooled value accessed after detach"),
        }
    }
}

impl<T> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match &mut self.value {
            Some(value) => value,
            None => unreachable!("pooled value accessed after detach"),
        }
    }
}

impl<T> AsRef<T> for Pooled<'_, T> {
    fn as_ref(&self) -> &T {
        self
    }
}

impl<T> AsMut<T> for Pooled<'_, T> {
    fn as_mut(&mut self) -> &mut T {
        self
    }
}

impl<T: fmt::Debug> fmt::Debug for Pooled<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pooled").field(&self.value).finish()
    }
}

impl<T> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take() {
            self.pool.recycle(value);
        }
    }
}
