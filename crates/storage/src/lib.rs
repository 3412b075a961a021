//! Storage layer for cellstore
//!
//! This crate implements the cells table and the action log behind the
//! [`Store`] / [`StoreTxn`] contract:
//! - MemoryStore: sharded in-process cells, first-committer-wins commit
//! - SqliteStore: SQLite cells table over a connection pool (`sqlite` feature)
//! - Backend: runtime selection from [`StoreConfig`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod config;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod pool;
pub mod sharded;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;

pub use backend::{Backend, BackendTxn};
pub use config::{BackendKind, StoreConfig};
pub use memory::{MemoryStore, MemoryTxn};
pub use sharded::{Shard, ShardedCells};
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteOptions, SqliteStore, SqliteTxn};
pub use traits::{CellUpdate, IsolationLevel, NewCell, Store, StoreTxn, TxnOptions};
