//! Standalone error types for nebula-pool
//!
//! Pool operations never fail: a miss is resolved by constructing a new
//! instance. Errors only come from invalid configuration and from registry
//! misuse.

use thiserror::Error;

#[cfg(feature = "logging")]
use tracing::warn;

/// Pool errors
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Configuration rejected by `PoolConfig::validate`
    #[error("Invalid pool configuration: {reason}")]
    InvalidConfig {
        /// What is wrong with the configuration
        reason: String,
    },

    /// Registry kind already holds a pool of another type
    #[error("Pool kind '{kind}' is already registered with a different type (expected {expected})")]
    KindMismatch {
        /// Display name of the pool kind
        kind: String,
        /// Pool type the caller asked for
        expected: &'static str,
    },
}

impl PoolError {
    /// Get error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "POOL:CONFIG:INVALID",
            Self::KindMismatch { .. } => "POOL:REGISTRY:KIND_MISMATCH",
        }
    }

    /// Create invalid config error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create kind mismatch error
    pub fn kind_mismatch(kind: impl ToString, expected: &'static str) -> Self {
        let kind = kind.to_string();

        #[cfg(feature = "logging")]
        warn!(%kind, expected, "pool kind registered with a different type");

        Self::KindMismatch { kind, expected }
    }
}

impl From<PoolError> for std::io::Error {
    fn from(err: PoolError) -> Self {
        Self::other(err)
    }
}

/// Result type for pool operations
pub type PoolResult<T> = core::result::Result<T, PoolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            PoolError::invalid_config("max_entries").code(),
            "POOL:CONFIG:INVALID"
        );
        assert_eq!(
            PoolError::kind_mismatch("byte-buffer", "SizedPool<Vec<u8>>").code(),
            "POOL:REGISTRY:KIND_MISMATCH"
        );
    }

    #[test]
    fn test_error_messages() {
        let error = PoolError::invalid_config("max_entries must be greater than 0");
        assert!(error.to_string().contains("max_entries"));

        let error = PoolError::kind_mismatch("custom:frames", "FixedPool<String>");
        assert!(error.to_string().contains("custom:frames"));
        assert!(error.to_string().contains("FixedPool<String>"));
    }

    #[test]
    fn test_into_io_error() {
        let io: std::io::Error = PoolError::invalid_config("bad").into();
        assert_eq!(io.kind(), std::io::ErrorKind::Other);
        assert!(io.to_string().contains("bad"));
    }
}
