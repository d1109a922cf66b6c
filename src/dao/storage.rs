//! Backend-agnostic storage error surface.

use std::error::Error;

use thiserror::Error;

use crate::state::scoreboard::MergeError;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend could not be reached or answered unexpectedly.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Human-readable description of the failure.
        message: String,
        /// Backend-specific cause.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// Concurrent writers kept beating this update; nothing was stored.
    #[error("storage write conflict: {message}")]
    Conflict {
        /// Human-readable description of the conflict.
        message: String,
    },
    /// The submitted patch cannot be applied to the record.
    #[error("patch rejected: {source}")]
    InvalidPatch {
        /// What the merge machinery objected to.
        #[source]
        source: MergeError,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}
