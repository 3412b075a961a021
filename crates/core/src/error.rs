//! Error types for cellstore
//!
//! Every failure an apply can produce falls into one of four kinds:
//!
//! | Kind | Variant | Recoverable |
//! |------|---------|-------------|
//! | MarshalError | [`Error::Marshal`] | No (fix the model) |
//! | StoreError | [`Error::Store`], [`Error::DuplicateKey`], [`Error::Io`] | Depends on cause |
//! | ErrOptimisticLock | [`Error::OptimisticLock`] | Yes (re-read, retry) |
//! | InternalInvariantError | [`Error::Invariant`] | Never |

use thiserror::Error;

/// Result type alias for cellstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the data model, the stores and the apply engine
#[derive(Debug, Error)]
pub enum Error {
    /// A model failed to produce its payload
    #[error("marshal failed for {row}/{column}: {message}")]
    Marshal {
        /// Row of the entity whose model failed
        row: String,
        /// Column of the entity whose model failed
        column: String,
        /// Error carried by the model's item
        message: String,
    },

    /// A model rejected the payload it was asked to bind
    #[error("unmarshal failed: {0}")]
    Unmarshal(String),

    /// Cell does not exist
    #[error("cell not found: {row}/{column}")]
    NotFound {
        /// Row identifier
        row: String,
        /// Column name
        column: String,
    },

    /// Insert hit the (row, column) uniqueness constraint
    #[error("duplicate key: {row}/{column}")]
    DuplicateKey {
        /// Row identifier
        row: String,
        /// Column name
        column: String,
    },

    /// Conditional update matched no row: the held version is stale
    #[error("optimistic lock: {row}/{column} is no longer at version {version}")]
    OptimisticLock {
        /// Row identifier
        row: String,
        /// Column name
        column: String,
        /// Version the caller held when the update was attempted
        version: u64,
    },

    /// Store uniqueness invariant is broken (bug, never retry)
    #[error("invariant violation: {0}")]
    Invariant(String),

    /// Underlying store failure, passed through with its message
    #[error("store error: {0}")]
    Store(String),

    /// Serialization failure outside of a model (action parameters, records)
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build the error for a conditional update that touched more than one row
    pub fn more_than_one_updated(row: &str, column: &str, affected: u64) -> Self {
        Error::Invariant(format!(
            "more than one record updated for {}/{} ({} rows)",
            row, column, affected
        ))
    }

    /// True for the stale-version conflict callers are expected to handle
    pub fn is_optimistic_lock(&self) -> bool {
        matches!(self, Error::OptimisticLock { .. })
    }

    /// True if the cell was absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// True if an insert collided with an existing cell
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Error::DuplicateKey { .. })
    }

    /// True for store-level failures, including constraint violations
    pub fn is_store(&self) -> bool {
        matches!(
            self,
            Error::Store(_) | Error::DuplicateKey { .. } | Error::Io(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
