//! Reclaimable handles for pooled instances
//!
//! A pooled instance is owned by the pool but may be discarded at any time
//! while it sits unused: it expires after the configured idle time, a
//! pressure sweep (`reclaim`) drops it, or the entry cap evicts it. Pools
//! treat every slot as possibly already gone and skip dead ones silently.

use std::time::{Duration, Instant};

/// Slot holding a pooled instance that can be reclaimed while idle
#[derive(Debug)]
pub struct Reclaimable<T> {
    value: Option<T>,
    pooled_at: Instant,
}

impl<T> Reclaimable<T> {
    /// Wrap an instance that is entering the pool now
    pub fn new(value: T) -> Self {
        Self::at(value, Instant::now())
    }

    pub(crate) fn at(value: T, pooled_at: Instant) -> Self {
        Self {
            value: Some(value),
            pooled_at,
        }
    }

    /// Check whether the instance is still present and within its idle time
    #[inline]
    pub fn is_live(&self, max_idle: Option<Duration>, now: Instant) -> bool {
        self.value.is_some() && !self.is_expired(max_idle, now)
    }

    /// Access the instance if it has not been cleared
    ///
    /// Expiry is not considered here; use [`is_live`](Self::is_live).
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Take the instance out if it is still live
    ///
    /// An expired instance is dropped and `None` is returned.
    pub fn take(&mut self, max_idle: Option<Duration>, now: Instant) -> Option<T> {
        if self.is_expired(max_idle, now) {
            self.value = None;
        }
        self.value.take()
    }

    /// Move the instance out regardless of expiry
    pub(crate) fn release(&mut self) -> Option<T> {
        self.value.take()
    }

    /// Drop the instance, leaving a dead slot behind
    ///
    /// Returns `true` if an instance was present.
    pub fn clear(&mut self) -> bool {
        self.value.take().is_some()
    }

    /// Instant at which the instance entered the pool
    pub fn pooled_at(&self) -> Instant {
        self.pooled_at
    }

    fn is_expired(&self, max_idle: Option<Duration>, now: Instant) -> bool {
        max_idle.is_some_and(|idle| now.saturating_duration_since(self.pooled_at) > idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_until_cleared() {
        let mut slot = Reclaimable::new(vec![1u8, 2, 3]);
        let now = Instant::now();
        assert!(slot.is_live(None, now));
        assert_eq!(slot.get().map(Vec::len), Some(3));

        assert!(slot.clear());
        assert!(!slot.is_live(None, now));
        assert!(!slot.clear());
        assert!(slot.take(None, now).is_none());
    }

    #[test]
    fn test_expires_after_idle_time() {
        let start = Instant::now();
        let mut slot = Reclaimable::at(String::from("x"), start);
        let idle = Some(Duration::from_secs(10));

        assert!(slot.is_live(idle, start + Duration::from_secs(10)));
        assert!(!slot.is_live(idle, start + Duration::from_secs(11)));
        assert!(slot.take(idle, start + Duration::from_secs(11)).is_none());
        assert!(slot.get().is_none());
    }

    #[test]
    fn test_take_live_value() {
        let start = Instant::now();
        let mut slot = Reclaimable::at(42_u32, start);
        assert_eq!(slot.take(Some(Duration::from_secs(1)), start), Some(42));
        assert!(slot.take(None, start).is_none());
    }
}
