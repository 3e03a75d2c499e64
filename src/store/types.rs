//! Store error definitions.

use thiserror::Error;

/// Errors raised by a [`KeyValueStore`](super::KeyValueStore) backend.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Could not reach the store.
    #[error("Store connection error: {0}")]
    Connection(String),

    /// The store rejected or failed a command.
    #[error("Store command error: {0}")]
    Command(String),

    /// The operation did not finish in time.
    #[error("Store timeout after {0} seconds")]
    Timeout(u64),

    /// A stored value has the wrong shape for the requested operation.
    #[error("Invalid value at '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

impl From<::redis::RedisError> for StoreError {
    fn from(err: ::redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_connection_dropped() || err.is_io_error() {
            StoreError::Connection(err.to_string())
        } else if err.is_timeout() {
            StoreError::Command(format!("timed out: {}", err))
        } else {
            StoreError::Command(err.to_string())
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::Timeout(5);
        assert_eq!(err.to_string(), "Store timeout after 5 seconds");

        let err = StoreError::InvalidValue {
            key: "cb:svc:failures".to_string(),
            reason: "not an integer".to_string(),
        };
        assert!(err.to_string().contains("cb:svc:failures"));
    }

    #[test]
    fn test_redis_io_error_maps_to_connection() {
        let err: StoreError =
            ::redis::RedisError::from((::redis::ErrorKind::IoError, "connection refused")).into();
        assert!(matches!(err, StoreError::Connection(_)));
    }
}
