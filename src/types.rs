//! Public types for the cellstore API.
//!
//! This module re-exports types from internal crates with a clean public interface.

// Cell identity and payload contract
pub use cellstore_core::{CellRecord, Item, JsonModel, Model, Ref};

// Entities and change sets
pub use cellstore_core::{Batch, Change, ChangeType, Entity, Persist};

// Action log
pub use cellstore_core::{ActionParams, ActionRecord};
pub use cellstore_engine::{Action, ActionOutcome};

// Store configuration
pub use cellstore_storage::{BackendKind, IsolationLevel, StoreConfig};

// Error contract for custom models
pub use cellstore_core::{Error as ModelError, Result as ModelResult};
