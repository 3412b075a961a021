//! Runtime-selected store
//!
//! [`Backend`] lets the facade pick a store from configuration while the
//! engine stays generic over [`Store`].

use crate::config::{BackendKind, StoreConfig};
use crate::memory::{MemoryStore, MemoryTxn};
use crate::traits::{CellUpdate, NewCell, Store, StoreTxn, TxnOptions};
use cellstore_core::{ActionRecord, CellRecord, Result};

#[cfg(feature = "sqlite")]
use crate::sqlite::{SqliteStore, SqliteTxn};

/// One of the available stores
#[derive(Debug)]
pub enum Backend {
    /// In-process sharded store
    Memory(MemoryStore),
    /// SQLite database
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteStore),
}

impl Backend {
    /// Open the store described by `config`
    pub fn open(config: &StoreConfig) -> Result<Self> {
        match &config.backend {
            BackendKind::Memory => Ok(Backend::Memory(MemoryStore::new())),
            #[cfg(feature = "sqlite")]
            BackendKind::SqliteMemory => Ok(Backend::Sqlite(SqliteStore::open_in_memory(
                config.sqlite_options(),
            )?)),
            #[cfg(feature = "sqlite")]
            BackendKind::SqliteFile { path } => Ok(Backend::Sqlite(SqliteStore::open(
                path,
                config.sqlite_options(),
            )?)),
            #[cfg(not(feature = "sqlite"))]
            other => Err(cellstore_core::Error::Store(format!(
                "backend {:?} requires the `sqlite` feature",
                other
            ))),
        }
    }

    /// Short backend name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Memory(_) => "memory",
            #[cfg(feature = "sqlite")]
            Backend::Sqlite(_) => "sqlite",
        }
    }
}

/// Transaction of a [`Backend`]
pub enum BackendTxn<'s> {
    /// Memory transaction
    Memory(MemoryTxn<'s>),
    /// SQLite transaction
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteTxn<'s>),
}

impl Store for Backend {
    type Txn<'s> = BackendTxn<'s>;

    fn begin(&self, options: TxnOptions) -> Result<BackendTxn<'_>> {
        match self {
            Backend::Memory(store) => store.begin(options).map(BackendTxn::Memory),
            #[cfg(feature = "sqlite")]
            Backend::Sqlite(store) => store.begin(options).map(BackendTxn::Sqlite),
        }
    }

    fn get(&self, row_id: &str, column_name: &str) -> Result<CellRecord> {
        match self {
            Backend::Memory(store) => store.get(row_id, column_name),
            #[cfg(feature = "sqlite")]
            Backend::Sqlite(store) => store.get(row_id, column_name),
        }
    }

    fn append_action(&self, record: &ActionRecord) -> Result<()> {
        match self {
            Backend::Memory(store) => store.append_action(record),
            #[cfg(feature = "sqlite")]
            Backend::Sqlite(store) => store.append_action(record),
        }
    }

    fn get_action(&self, id: &str) -> Result<Option<ActionRecord>> {
        match self {
            Backend::Memory(store) => store.get_action(id),
            #[cfg(feature = "sqlite")]
            Backend::Sqlite(store) => store.get_action(id),
        }
    }
}

impl StoreTxn for BackendTxn<'_> {
    fn insert(&mut self, cell: NewCell<'_>) -> Result<()> {
        match self {
            BackendTxn::Memory(txn) => txn.insert(cell),
            #[cfg(feature = "sqlite")]
            BackendTxn::Sqlite(txn) => txn.insert(cell),
        }
    }

    fn update_if_version(&mut self, update: CellUpdate<'_>) -> Result<u64> {
        match self {
            BackendTxn::Memory(txn) => txn.update_if_version(update),
            #[cfg(feature = "sqlite")]
            BackendTxn::Sqlite(txn) => txn.update_if_version(update),
        }
    }

    fn commit(self) -> Result<()> {
        match self {
            BackendTxn::Memory(txn) => txn.commit(),
            #[cfg(feature = "sqlite")]
            BackendTxn::Sqlite(txn) => txn.commit(),
        }
    }
}
