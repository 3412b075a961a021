//! Store contract used by the apply engine
//!
//! A [`Store`] hands out transactions ([`StoreTxn`]) and serves single-cell
//! reads. The engine never inspects why a store call failed beyond the
//! number of rows a conditional update touched.
//!
//! ## Scoped transactions
//!
//! A `StoreTxn` that is dropped without [`StoreTxn::commit`] MUST roll back
//! and release whatever it holds (connection, staged writes). The engine
//! relies on this for every early-return path.

use cellstore_core::{ActionRecord, CellRecord, Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Isolation level requested for a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationLevel {
    /// Whatever the backend uses by default
    #[default]
    Default,
    /// Read committed data only
    ReadCommitted,
    /// Stable reads for the duration of the transaction
    RepeatableRead,
    /// Fully serialized transactions
    Serializable,
}

/// Options for opening a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TxnOptions {
    /// Requested isolation level
    pub isolation: IsolationLevel,
    /// Reject writes when true
    pub read_only: bool,
}

impl TxnOptions {
    /// Read-write transaction at the given isolation level
    pub fn read_write(isolation: IsolationLevel) -> Self {
        Self {
            isolation,
            read_only: false,
        }
    }
}

/// Row written by an insert
#[derive(Debug, Clone, Copy)]
pub struct NewCell<'a> {
    /// Row identifier
    pub row_id: &'a str,
    /// Column name
    pub column_name: &'a str,
    /// Initial version (0 for new entities)
    pub version: u64,
    /// Payload
    pub data: &'a [u8],
    /// Insert time
    pub created_at: DateTime<Utc>,
    /// Last write time
    pub updated_at: DateTime<Utc>,
}

/// Version-checked update
///
/// Matches only the row whose (row_id, column_name, version) equals
/// (`row_id`, `column_name`, `expected_version`); on match the store writes
/// `data`, `updated_at` and version `expected_version + 1`.
#[derive(Debug, Clone, Copy)]
pub struct CellUpdate<'a> {
    /// Row identifier
    pub row_id: &'a str,
    /// Column name
    pub column_name: &'a str,
    /// Version the writer holds
    pub expected_version: u64,
    /// New payload
    pub data: &'a [u8],
    /// New modification time
    pub updated_at: DateTime<Utc>,
}

impl CellUpdate<'_> {
    /// Version the row carries after a successful update
    ///
    /// Fails with `Error::Invariant` when the counter is exhausted.
    pub fn next_version(&self) -> Result<u64> {
        self.expected_version.checked_add(1).ok_or_else(|| {
            Error::Invariant(format!(
                "version overflow on {}/{}",
                self.row_id, self.column_name
            ))
        })
    }
}

/// Backend holding the cells table and the action log
pub trait Store: Send + Sync {
    /// Transaction type; borrows the store for its lifetime
    type Txn<'s>: StoreTxn
    where
        Self: 's;

    /// Open an atomic scope
    fn begin(&self, options: TxnOptions) -> Result<Self::Txn<'_>>;

    /// Latest committed state of a cell, or `Error::NotFound`
    fn get(&self, row_id: &str, column_name: &str) -> Result<CellRecord>;

    /// Append an entry to the action log, outside any transaction
    fn append_action(&self, record: &ActionRecord) -> Result<()>;

    /// Fetch an action log entry by id
    fn get_action(&self, id: &str) -> Result<Option<ActionRecord>>;
}

/// One open atomic scope
pub trait StoreTxn {
    /// Insert a new cell; `Error::DuplicateKey` if (row, column) exists
    fn insert(&mut self, cell: NewCell<'_>) -> Result<()>;

    /// Conditional update; returns the number of rows it touched
    fn update_if_version(&mut self, update: CellUpdate<'_>) -> Result<u64>;

    /// Make every write of this scope durable and visible
    fn commit(self) -> Result<()>
    where
        Self: Sized;
}
