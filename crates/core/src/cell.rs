//! Versioned cell identity
//!
//! A cell is addressed by (row, column). Its [`Ref`] carries the version the
//! holder last observed plus creation and modification timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity, version and timestamps of a stored cell
///
/// (row_id, column_name) is unique within a store. The version starts at 0
/// on insert and grows by exactly 1 per successful update. Only the store
/// decides the next version; holders mirror it after the store accepted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ref {
    /// Row identifier
    pub row_id: String,
    /// Column name within the row
    pub column_name: String,
    /// Version last observed by the holder
    pub version: u64,
    /// When the cell was first inserted
    pub created_at: DateTime<Utc>,
    /// When the cell was last written
    pub updated_at: DateTime<Utc>,
}

impl Ref {
    /// Reference for a cell that does not exist yet
    ///
    /// Version is 0 and both timestamps are set to now.
    pub fn new(row_id: impl Into<String>, column_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            row_id: row_id.into(),
            column_name: column_name.into(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when the reference addresses the given cell
    pub fn addresses(&self, row_id: &str, column_name: &str) -> bool {
        self.row_id == row_id && self.column_name == column_name
    }
}

impl std::fmt::Display for Ref {
    /// Display as row/column@version
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}@{}", self.row_id, self.column_name, self.version)
    }
}

/// A stored cell as read back from a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRecord {
    /// Row identifier
    pub row_id: String,
    /// Column name
    pub column_name: String,
    /// Current version
    pub version: u64,
    /// Opaque payload
    pub data: Vec<u8>,
    /// Insert time
    pub created_at: DateTime<Utc>,
    /// Last write time
    pub updated_at: DateTime<Utc>,
}

impl CellRecord {
    /// Split into the reference and the payload
    pub fn into_parts(self) -> (Ref, Vec<u8>) {
        let reference = Ref {
            row_id: self.row_id,
            column_name: self.column_name,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        (reference, self.data)
    }
}
