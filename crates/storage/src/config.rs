//! Store configuration
//!
//! `StoreConfig` deserializes with `serde`, so a host application can embed
//! it in its own configuration file:
//!
//! ```text
//! [store]
//! pool_size = 8
//! busy_timeout_ms = 2000
//!
//! [store.backend]
//! kind = "sqlite_file"
//! path = "/var/lib/app/cells.db"
//! ```

use crate::traits::IsolationLevel;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Which store to open
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendKind {
    /// In-process store, nothing on disk
    #[default]
    Memory,
    /// Private in-memory SQLite database
    SqliteMemory,
    /// SQLite database file
    SqliteFile {
        /// Database file path
        path: PathBuf,
    },
}

/// Store and transaction settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store to open
    pub backend: BackendKind,
    /// Pooled connections (SQLite file backend)
    pub pool_size: usize,
    /// Lock wait per statement in milliseconds (SQLite)
    pub busy_timeout_ms: u64,
    /// Wait for a free pooled connection in milliseconds (SQLite)
    pub acquire_timeout_ms: u64,
    /// Isolation level of apply transactions
    pub isolation: IsolationLevel,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            pool_size: 4,
            busy_timeout_ms: 5_000,
            acquire_timeout_ms: 30_000,
            isolation: IsolationLevel::Default,
        }
    }
}

impl StoreConfig {
    /// Connection settings for the SQLite backend
    #[cfg(feature = "sqlite")]
    pub fn sqlite_options(&self) -> crate::sqlite::SqliteOptions {
        crate::sqlite::SqliteOptions {
            pool_size: self.pool_size,
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
            acquire_timeout: self.acquire_timeout(),
        }
    }

    /// Connection acquire timeout
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }
}
