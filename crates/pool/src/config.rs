//! Pool configuration

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{PoolError, PoolResult};

/// Default cap on retained entries per pool.
pub const DEFAULT_MAX_ENTRIES: usize = 256;

/// Default idle time after which a pooled entry is reclaimable.
pub const DEFAULT_MAX_IDLE: Duration = Duration::from_secs(300);

/// Configuration shared by [`FixedPool`](crate::FixedPool) and
/// [`SizedPool`](crate::SizedPool)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PoolConfig {
    /// Maximum number of retained entries (None for unbounded).
    ///
    /// When the cap is reached, `free` evicts the oldest entry.
    pub max_entries: Option<usize>,

    /// Idle time after which a pooled entry counts as reclaimed
    /// (None keeps entries until an explicit `reclaim`)
    pub max_idle: Option<Duration>,

    /// Number of instances created up front (`SizedPool` creates them at
    /// the smallest size class)
    pub initial_entries: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_entries: Some(DEFAULT_MAX_ENTRIES),
            max_idle: Some(DEFAULT_MAX_IDLE),
            initial_entries: 0,
        }
    }
}

impl PoolConfig {
    /// Create a bounded pool configuration
    pub fn bounded(max_entries: usize) -> Self {
        Self {
            max_entries: Some(max_entries),
            ..Default::default()
        }
    }

    /// Create an unbounded configuration that never expires entries
    pub fn unbounded() -> Self {
        Self {
            max_entries: None,
            max_idle: None,
            initial_entries: 0,
        }
    }

    /// Set maximum number of retained entries
    pub fn with_max_entries(mut self, max_entries: Option<usize>) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Set idle time after which entries are reclaimable
    pub fn with_max_idle(mut self, max_idle: Option<Duration>) -> Self {
        self.max_idle = max_idle;
        self
    }

    /// Set number of pre-warmed instances
    pub fn with_initial_entries(mut self, initial_entries: usize) -> Self {
        self.initial_entries = initial_entries;
        self
    }

    /// Validate pool configuration, returning an error if invalid.
    pub fn validate(&self) -> PoolResult<()> {
        if self.max_entries == Some(0) {
            return Err(PoolError::invalid_config(
                "max_entries must be greater than 0",
            ));
        }
        if self.max_idle.is_some_and(|idle| idle.is_zero()) {
            return Err(PoolError::invalid_config(
                "max_idle must be greater than zero",
            ));
        }
        if let Some(max) = self.max_entries
            && self.initial_entries > max
        {
            return Err(PoolError::invalid_config(format!(
                "initial_entries ({}) must not exceed max_entries ({max})",
                self.initial_entries
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = PoolConfig::default();
        assert_eq!(config.max_entries, Some(DEFAULT_MAX_ENTRIES));
        assert_eq!(config.max_idle, Some(DEFAULT_MAX_IDLE));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pool_config_bounded() {
        let config = PoolConfig::bounded(8);
        assert_eq!(config.max_entries, Some(8));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pool_config_unbounded() {
        let config = PoolConfig::unbounded();
        assert_eq!(config.max_entries, None);
        assert_eq!(config.max_idle, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_cap() {
        let err = PoolConfig::bounded(0).validate().unwrap_err();
        assert_eq!(err.code(), "POOL:CONFIG:INVALID");
    }

    #[test]
    fn test_validate_rejects_zero_idle() {
        let config = PoolConfig::default().with_max_idle(Some(Duration::ZERO));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_prewarm_above_cap() {
        let config = PoolConfig::bounded(2).with_initial_entries(3);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("initial_entries (3)"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_partial_config() {
        let config: PoolConfig = serde_json::from_str(r#"{"max_entries": 16}"#).unwrap();
        assert_eq!(config.max_entries, Some(16));
        assert_eq!(config.max_idle, Some(DEFAULT_MAX_IDLE));

        let json = serde_json::to_string(&config).unwrap();
        let back: PoolConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
