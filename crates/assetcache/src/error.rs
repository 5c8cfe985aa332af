//! Error types for assetcache

use thiserror::Error;

/// Result type alias for assetcache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to callers of the loader
#[derive(Debug, Error)]
pub enum Error {
    /// The background fetch for a key never produced an artifact
    #[error("fetch for {key} did not complete: {reason}")]
    Task {
        /// Store key of the in-flight request
        key: String,
        /// Why the task ended early
        reason: TaskFailure,
    },

    /// A fetch had to start outside a Tokio runtime
    #[error("loading {key} needs a Tokio runtime to run its fetch")]
    NoRuntime {
        /// Store key that missed the store
        key: String,
    },

    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// Durable store error outside the load path
    #[error(transparent)]
    Store(#[from] assetstore::Error),
}

/// Cloneable failure of a shared in-flight fetch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TaskFailure(pub String);
