//! Error types for RemitGuard.

use std::time::Duration;
use thiserror::Error;

/// Result type alias using `GuardError`.
pub type Result<T> = std::result::Result<T, GuardError>;

/// Errors that can occur during engine operations.
#[derive(Debug, Error)]
pub enum GuardError {
    /// The counter store cannot be reached.
    #[error("Counter store unavailable: {0}")]
    StoreUnavailable(String),

    /// A counter store call exceeded its bounded timeout.
    #[error("Counter store call timed out after {0:?}")]
    Timeout(Duration),

    /// A stored record could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Caller passed malformed input (empty identity, non-positive
    /// amount, bad currency code). This is the only error surfaced by
    /// public engine operations.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GuardError {
    /// Create a store-unavailable error.
    #[must_use]
    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        GuardError::StoreUnavailable(msg.into())
    }

    /// Create an invalid-argument error.
    #[must_use]
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        GuardError::InvalidArgument(msg.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        GuardError::Config(msg.into())
    }

    /// Returns true if this error is an infrastructure condition that the
    /// engine converts into its fail-open default (not-blocked / zero
    /// risk) instead of propagating to the caller.
    #[must_use]
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            GuardError::StoreUnavailable(_)
                | GuardError::Timeout(_)
                | GuardError::Serialization(_)
                | GuardError::Io(_)
        )
    }
}

impl From<serde_json::Error> for GuardError {
    fn from(err: serde_json::Error) -> Self {
        GuardError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infrastructure_classification() {
        assert!(GuardError::store_unavailable("down").is_infrastructure());
        assert!(GuardError::Timeout(Duration::from_millis(500)).is_infrastructure());
        assert!(!GuardError::invalid_argument("empty identity").is_infrastructure());
        assert!(!GuardError::config("bad threshold").is_infrastructure());
    }

    #[test]
    fn test_serde_error_conversion() {
        let err = serde_json::from_str::<serde_json::Value>("{not json")
            .map_err(GuardError::from)
            .unwrap_err();
        assert!(matches!(err, GuardError::Serialization(_)));
        assert!(err.is_infrastructure());
    }
}
