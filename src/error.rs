//! Unified error type for cellstore.
//!
//! This module wraps the internal error taxonomy into a stable public enum
//! and classifies it for callers deciding whether to retry.

use thiserror::Error;

/// All cellstore errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Cell not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Optimistic lock conflict: the held version is stale
    #[error("conflict: {0}")]
    Conflict(String),

    /// Insert collided with an existing cell
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// A model failed to marshal its payload
    #[error("marshal error: {0}")]
    Marshal(String),

    /// Payload or parameter (de)serialization failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Storage error
    #[error("storage error: {0}")]
    Storage(String),

    /// Internal error (broken store invariant)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for cellstore operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is retryable.
    ///
    /// Only optimistic lock conflicts are: re-read the cell and retry with
    /// the fresh version.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Check if this is a conflict error.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }

    /// Check if this is a duplicate key error.
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Error::DuplicateKey(_))
    }

    /// Check if this is a serious/unrecoverable error.
    pub fn is_serious(&self) -> bool {
        matches!(self, Error::Internal(_))
    }
}

impl From<cellstore_core::Error> for Error {
    fn from(e: cellstore_core::Error) -> Self {
        use cellstore_core::Error as CoreError;
        match e {
            CoreError::NotFound { row, column } => Error::NotFound(format!("{}/{}", row, column)),
            e @ CoreError::OptimisticLock { .. } => Error::Conflict(e.to_string()),
            CoreError::DuplicateKey { row, column } => {
                Error::DuplicateKey(format!("{}/{}", row, column))
            }
            e @ CoreError::Marshal { .. } => Error::Marshal(e.to_string()),
            CoreError::Unmarshal(msg) => Error::Serialization(msg),
            CoreError::Serialization(msg) => Error::Serialization(msg),
            CoreError::Invariant(msg) => Error::Internal(msg),
            CoreError::Store(msg) => Error::Storage(msg),
            CoreError::Io(e) => Error::Io(e),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
