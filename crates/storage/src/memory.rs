//! In-process store
//!
//! Committed cells live in a [`ShardedCells`] table. A [`MemoryTxn`] stages
//! its writes privately and sees committed data plus its own writes.
//!
//! ## Commit
//!
//! ```text
//! 1. Acquire the publication lock (exclusive)
//! 2. Revalidate staged writes against committed state:
//!    - inserted cells must still be absent      → else DuplicateKey
//!    - updated cells must still be at base version → else OptimisticLock
//! 3. Publish every staged write
//! 4. Release the lock
//! ```
//!
//! Single-cell reads take the same lock shared, so a reader never observes
//! half of a published batch. Dropping an uncommitted transaction discards
//! its staged writes.

use crate::sharded::ShardedCells;
use crate::traits::{CellUpdate, NewCell, Store, StoreTxn, TxnOptions};
use cellstore_core::{ActionRecord, CellRecord, Error, Result};
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

type CellKey = (String, String);

/// In-memory cells table and action log
#[derive(Debug, Default)]
pub struct MemoryStore {
    cells: ShardedCells,
    /// Held shared by reads, exclusively while a commit publishes
    publish_lock: RwLock<()>,
    actions: Mutex<Vec<ActionRecord>>,
    next_txn_id: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of committed cells
    pub fn cell_count(&self) -> usize {
        let _read = self.publish_lock.read();
        self.cells.total_cells()
    }

    /// Number of action log entries
    pub fn action_count(&self) -> usize {
        self.actions.lock().len()
    }

    fn committed(&self, row_id: &str, column_name: &str) -> Option<CellRecord> {
        let _read = self.publish_lock.read();
        self.cells.get(row_id, column_name)
    }
}

impl Store for MemoryStore {
    type Txn<'s> = MemoryTxn<'s>;

    fn begin(&self, options: TxnOptions) -> Result<MemoryTxn<'_>> {
        let txn_id = self.next_txn_id.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(MemoryTxn {
            store: self,
            txn_id,
            options,
            staged: FxHashMap::default(),
            order: Vec::new(),
            finished: false,
        })
    }

    fn get(&self, row_id: &str, column_name: &str) -> Result<CellRecord> {
        self.committed(row_id, column_name)
            .ok_or_else(|| Error::NotFound {
                row: row_id.to_string(),
                column: column_name.to_string(),
            })
    }

    fn append_action(&self, record: &ActionRecord) -> Result<()> {
        let mut actions = self.actions.lock();
        if actions.iter().any(|a| a.id == record.id) {
            return Err(Error::Store(format!(
                "action log id {} already exists",
                record.id
            )));
        }
        actions.push(record.clone());
        Ok(())
    }

    fn get_action(&self, id: &str) -> Result<Option<ActionRecord>> {
        Ok(self.actions.lock().iter().find(|a| a.id == id).cloned())
    }
}

/// A staged write
#[derive(Debug)]
enum Staged {
    /// Cell created by this transaction
    Insert(CellRecord),
    /// Cell that was committed at `base_version` when first updated here
    Update { base_version: u64, record: CellRecord },
}

/// Transaction over a [`MemoryStore`]
#[derive(Debug)]
pub struct MemoryTxn<'s> {
    store: &'s MemoryStore,
    txn_id: u64,
    options: TxnOptions,
    staged: FxHashMap<CellKey, Staged>,
    /// Keys in first-write order, so publication is deterministic
    order: Vec<CellKey>,
    finished: bool,
}

impl MemoryTxn<'_> {
    fn ensure_writable(&self) -> Result<()> {
        if self.options.read_only {
            return Err(Error::Store(format!(
                "transaction {} is read-only",
                self.txn_id
            )));
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        for key in &self.order {
            let (row, column) = key;
            match self.staged.get(key) {
                Some(Staged::Insert(_)) => {
                    if self.store.cells.contains(row, column) {
                        return Err(Error::DuplicateKey {
                            row: row.clone(),
                            column: column.clone(),
                        });
                    }
                }
                Some(Staged::Update { base_version, .. }) => {
                    if self.store.cells.version(row, column) != Some(*base_version) {
                        return Err(Error::OptimisticLock {
                            row: row.clone(),
                            column: column.clone(),
                            version: *base_version,
                        });
                    }
                }
                None => {
                    return Err(Error::Invariant(format!(
                        "staged key {}/{} has no write",
                        row, column
                    )))
                }
            }
        }
        Ok(())
    }
}

impl StoreTxn for MemoryTxn<'_> {
    fn insert(&mut self, cell: NewCell<'_>) -> Result<()> {
        self.ensure_writable()?;

        let key = (cell.row_id.to_string(), cell.column_name.to_string());
        if self.staged.contains_key(&key)
            || self.store.committed(cell.row_id, cell.column_name).is_some()
        {
            return Err(Error::DuplicateKey {
                row: key.0,
                column: key.1,
            });
        }

        let record = CellRecord {
            row_id: key.0.clone(),
            column_name: key.1.clone(),
            version: cell.version,
            data: cell.data.to_vec(),
            created_at: cell.created_at,
            updated_at: cell.updated_at,
        };
        self.order.push(key.clone());
        self.staged.insert(key, Staged::Insert(record));
        Ok(())
    }

    fn update_if_version(&mut self, update: CellUpdate<'_>) -> Result<u64> {
        self.ensure_writable()?;

        let key = (update.row_id.to_string(), update.column_name.to_string());
        let next_version = update.next_version()?;

        if let Some(staged) = self.staged.get_mut(&key) {
            let record = match staged {
                Staged::Insert(record) | Staged::Update { record, .. } => record,
            };
            if record.version != update.expected_version {
                return Ok(0);
            }
            record.data = update.data.to_vec();
            record.version = next_version;
            record.updated_at = update.updated_at;
            return Ok(1);
        }

        let current = match self.store.committed(update.row_id, update.column_name) {
            Some(current) if current.version == update.expected_version => current,
            _ => return Ok(0),
        };

        let record = CellRecord {
            data: update.data.to_vec(),
            version: next_version,
            updated_at: update.updated_at,
            ..current
        };
        self.order.push(key.clone());
        self.staged.insert(
            key,
            Staged::Update {
                base_version: update.expected_version,
                record,
            },
        );
        Ok(1)
    }

    fn commit(mut self) -> Result<()> {
        let _publish = self.store.publish_lock.write();

        self.validate()?;

        let order = std::mem::take(&mut self.order);
        let mut staged = std::mem::take(&mut self.staged);
        for key in &order {
            if let Some(write) = staged.remove(key) {
                let record = match write {
                    Staged::Insert(record) | Staged::Update { record, .. } => record,
                };
                self.store.cells.put(record);
            }
        }

        self.finished = true;
        debug!(txn_id = self.txn_id, cells = order.len(), "memory txn committed");
        Ok(())
    }
}

impl Drop for MemoryTxn<'_> {
    fn drop(&mut self) {
        if !self.finished && !self.staged.is_empty() {
            debug!(
                txn_id = self.txn_id,
                discarded = self.staged.len(),
                "memory txn rolled back"
            );
        }
    }
}
