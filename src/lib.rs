//! # cellstore
//!
//! Versioned cell store with atomic batch apply and optimistic concurrency.
//!
//! Entities are opaque models stored as binary cells addressed by
//! (row, column). Writes are staged in a [`Batch`] and applied all-or-nothing;
//! every update carries the version its writer last read, and a stale
//! version fails the whole batch with a conflict instead of overwriting.
//!
//! ## Quick Start
//!
//! ```ignore
//! use cellstore::prelude::*;
//!
//! let db = CellStore::open("./cells.db")?;
//!
//! let mut doc = Entity::new("r1", "c1", JsonModel(json!({"n": 1})));
//! let mut batch = Batch::new();
//! batch.add(&mut doc);
//! db.apply_changes(&mut batch)?;
//!
//! // Later: update at the held version
//! let mut doc: Entity<JsonModel<serde_json::Value>> = db.load("r1", "c1")?;
//! doc.model.0["n"] = json!(2);
//! let mut batch = Batch::new();
//! batch.update(&mut doc);
//! match db.apply_changes(&mut batch) {
//!     Err(e) if e.is_retryable() => { /* re-read and retry */ }
//!     other => other?,
//! }
//! ```
//!
//! ## Backends
//!
//! - In-process ([`CellStore::ephemeral`]): sharded maps, nothing on disk
//! - SQLite ([`CellStore::open`]): cells table over a connection pool

#![warn(missing_docs)]

mod database;
mod error;
mod types;

pub mod prelude;

// Re-export main entry points
pub use database::{CellStore, CellStoreBuilder};
pub use error::{Error, Result};

// Re-export types
pub use types::*;
