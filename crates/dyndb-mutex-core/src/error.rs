//! Error types for mutex operations.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during lock operations.
#[derive(Error, Debug)]
pub enum LockError {
    /// A blocking `lock()` exceeded its timeout, or a scoped acquisition
    /// could not obtain the lock. Recoverable: retry later, or treat as
    /// "someone else holds it".
    #[error("failed to acquire lock '{name}' after {waited:?}")]
    AcquireLockFailed {
        /// The mutex name that could not be locked.
        name: String,
        /// How long the caller waited before giving up.
        waited: Duration,
    },

    /// The backing store failed after exhausting its built-in transient
    /// retries. An infrastructure fault, not a contention signal.
    #[error("lock store unavailable: {0}")]
    StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Invalid mutex name.
    #[error("invalid mutex name: {0}")]
    InvalidName(String),
}

/// Result type for lock operations.
pub type LockResult<T> = Result<T, LockError>;
