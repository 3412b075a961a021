//! Convenient imports for cellstore.
//!
//! ```ignore
//! use cellstore::prelude::*;
//!
//! let db = CellStore::ephemeral()?;
//! ```

// Main entry point
pub use crate::database::{CellStore, CellStoreBuilder};

// Error handling
pub use crate::error::{Error, Result};

// Core types
pub use crate::types::{
    Action, ActionParams, Batch, ChangeType, Entity, Item, JsonModel, Model, Ref,
};

// Re-export serde_json for convenience
pub use serde_json::json;
