//! Engine entry point
//!
//! [`Engine`] owns a store and the transaction options every apply uses.
//! It is `Send + Sync` whenever the store is, so concurrent callers share
//! one engine behind an `Arc` and each apply opens its own atomic scope.

use cellstore_core::{Entity, Model, Ref, Result};
use cellstore_storage::{IsolationLevel, Store, TxnOptions};

/// Apply engine over a store
#[derive(Debug)]
pub struct Engine<S> {
    pub(crate) store: S,
    pub(crate) options: TxnOptions,
}

impl<S: Store> Engine<S> {
    /// Engine using the store's default isolation, read-write
    pub fn new(store: S) -> Self {
        Self::with_isolation(store, IsolationLevel::Default)
    }

    /// Engine whose applies run at `isolation`
    pub fn with_isolation(store: S, isolation: IsolationLevel) -> Self {
        Self {
            store,
            options: TxnOptions::read_write(isolation),
        }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Latest committed reference and payload of a cell
    ///
    /// Fails with `Error::NotFound` when the cell is absent.
    pub fn get(&self, row_id: &str, column_name: &str) -> Result<(Ref, Vec<u8>)> {
        Ok(self.store.get(row_id, column_name)?.into_parts())
    }

    /// Read a cell and bind it into a fresh model
    pub fn load<M: Model + Default>(&self, row_id: &str, column_name: &str) -> Result<Entity<M>> {
        let (reference, data) = self.get(row_id, column_name)?;
        let mut model = M::default();
        model.unmarshal(&reference, &data)?;
        Ok(Entity::existing(reference, model))
    }
}
