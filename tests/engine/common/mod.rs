//! Shared helpers for integration tests.

#![allow(dead_code)]

pub use cellstore::prelude::*;
pub use cellstore::{BackendKind, ModelResult, Persist, StoreConfig};

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Simple JSON document used as a cell payload.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub n: i64,
}

pub type CounterEntity = Entity<JsonModel<Counter>>;

/// Model whose marshal always fails.
#[derive(Debug, Default)]
pub struct Unencodable;

impl Model for Unencodable {
    fn marshal(&self) -> Item {
        Item::failed("payload cannot be encoded")
    }

    fn unmarshal(&mut self, _: &Ref, _: &[u8]) -> ModelResult<()> {
        Ok(())
    }
}

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique row id so tests sharing a store never collide.
pub fn unique_row(prefix: &str) -> String {
    format!("{}-{}", prefix, COUNTER.fetch_add(1, Ordering::Relaxed))
}

pub fn counter(row: &str, column: &str, n: i64) -> CounterEntity {
    Entity::new(row, column, JsonModel(Counter { n }))
}

/// Route engine logs to the test harness output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Every backend that works without external setup.
pub fn all_stores() -> Vec<CellStore> {
    init_tracing();
    let mut stores = vec![CellStore::ephemeral().expect("memory store")];
    #[cfg(feature = "sqlite")]
    stores.push(
        CellStore::builder()
            .sqlite_memory()
            .open()
            .expect("sqlite memory store"),
    );
    stores
}

/// Insert a single entity, panicking on failure.
pub fn insert(db: &CellStore, entity: &mut dyn Persist) {
    let mut batch = Batch::new();
    batch.add(entity);
    db.apply_changes(&mut batch).expect("insert");
}

/// Update a single entity at its held version.
pub fn update(db: &CellStore, entity: &mut dyn Persist) -> Result<()> {
    let mut batch = Batch::new();
    batch.update(entity);
    db.apply_changes(&mut batch)
}

/// Read the raw state of a cell, `None` when absent.
pub fn snapshot(db: &CellStore, row: &str, column: &str) -> Option<(u64, Vec<u8>)> {
    match db.get(row, column) {
        Ok((reference, data)) => Some((reference.version, data)),
        Err(e) if e.is_not_found() => None,
        Err(e) => panic!("unexpected read error: {}", e),
    }
}
