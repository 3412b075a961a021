//! Main entry point for cellstore.
//!
//! This module provides [`CellStore`], a cheaply cloneable handle over the
//! apply engine, and [`CellStoreBuilder`] for configuration.

use crate::error::Result;
use cellstore_core::{ActionParams, ActionRecord, Batch, Entity, Model, Ref};
use cellstore_engine::{Action, ActionOutcome, Engine};
use cellstore_storage::{Backend, BackendKind, IsolationLevel, StoreConfig};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// The cell store.
///
/// Clones share the same engine and store. Each call that writes opens its
/// own atomic scope, so handles can be used from many threads at once.
///
/// # Example
///
/// ```ignore
/// use cellstore::prelude::*;
///
/// let db = CellStore::ephemeral()?;
///
/// let mut doc = Entity::new("user:1", "profile", JsonModel(json!({"n": 1})));
/// let mut batch = Batch::new();
/// batch.add(&mut doc);
/// db.apply_changes(&mut batch)?;
///
/// let (reference, data) = db.get("user:1", "profile")?;
/// ```
#[derive(Clone)]
pub struct CellStore {
    inner: Arc<Engine<Backend>>,
    config: Arc<StoreConfig>,
}

impl CellStore {
    /// Open (or create) a SQLite database file with default settings.
    #[cfg(feature = "sqlite")]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder().path(path).open()
    }

    /// Create an in-process store with no disk I/O.
    ///
    /// All data is lost when the last handle is dropped.
    pub fn ephemeral() -> Result<Self> {
        Self::builder().ephemeral().open()
    }

    /// Create a builder for store configuration.
    pub fn builder() -> CellStoreBuilder {
        CellStoreBuilder::new()
    }

    /// Open the store described by `config`.
    pub fn from_config(config: StoreConfig) -> Result<Self> {
        let backend = Backend::open(&config)?;
        tracing::info!(backend = backend.name(), isolation = ?config.isolation, "cellstore opened");
        Ok(Self {
            inner: Arc::new(Engine::with_isolation(backend, config.isolation)),
            config: Arc::new(config),
        })
    }

    /// Latest committed reference and payload of a cell.
    pub fn get(&self, row_id: &str, column_name: &str) -> Result<(Ref, Vec<u8>)> {
        Ok(self.inner.get(row_id, column_name)?)
    }

    /// Read a cell into a fresh model.
    pub fn load<M: Model + Default>(&self, row_id: &str, column_name: &str) -> Result<Entity<M>> {
        Ok(self.inner.load(row_id, column_name)?)
    }

    /// Apply every change of `batch` atomically.
    ///
    /// Updated entities have their held version advanced on success.
    pub fn apply_changes(&self, batch: &mut Batch<'_>) -> Result<()> {
        Ok(self.inner.apply_changes(batch)?)
    }

    /// Record that `name` ran with `params` (outside any apply).
    pub fn write_log(&self, name: &str, params: &ActionParams) -> Result<ActionRecord> {
        Ok(self.inner.write_log(name, params)?)
    }

    /// Fetch an action log entry.
    pub fn action(&self, id: &str) -> Result<Option<ActionRecord>> {
        Ok(self.inner.action(id)?)
    }

    /// Stage, apply and log an action.
    pub fn run_action<A: Action + ?Sized>(
        &self,
        action: &mut A,
        params: &ActionParams,
    ) -> Result<ActionOutcome> {
        Ok(self.inner.run_action(action, params)?)
    }

    /// Short name of the backend in use.
    pub fn backend_name(&self) -> &'static str {
        self.inner.store().name()
    }

    /// Configuration the store was opened with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

impl std::fmt::Debug for CellStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellStore")
            .field("backend", &self.backend_name())
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for store configuration.
///
/// # Example
///
/// ```ignore
/// // Production: SQLite file with a larger pool
/// let db = CellStore::builder()
///     .path("./cells.db")
///     .pool_size(8)
///     .busy_timeout(Duration::from_secs(2))
///     .open()?;
///
/// // Unit testing: no disk at all
/// let db = CellStore::builder().ephemeral().open()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct CellStoreBuilder {
    config: StoreConfig,
}

impl CellStoreBuilder {
    /// Create a new builder with default settings (in-process store).
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Use the in-process store.
    pub fn ephemeral(mut self) -> Self {
        self.config.backend = BackendKind::Memory;
        self
    }

    /// Use a private in-memory SQLite database.
    pub fn sqlite_memory(mut self) -> Self {
        self.config.backend = BackendKind::SqliteMemory;
        self
    }

    /// Use a SQLite database file.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.config.backend = BackendKind::SqliteFile {
            path: path.as_ref().to_path_buf(),
        };
        self
    }

    /// Number of pooled SQLite connections.
    pub fn pool_size(mut self, size: usize) -> Self {
        self.config.pool_size = size;
        self
    }

    /// How long a SQLite statement waits on a locked database.
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.config.busy_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// How long a caller waits for a pooled connection.
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.config.acquire_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Isolation level of apply transactions.
    pub fn isolation(mut self, isolation: IsolationLevel) -> Self {
        self.config.isolation = isolation;
        self
    }

    /// Open the store.
    pub fn open(self) -> Result<CellStore> {
        CellStore::from_config(self.config)
    }
}
