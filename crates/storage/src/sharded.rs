//! Sharded committed-cell table
//!
//! DashMap keyed by row id, FxHashMap of columns within each row.
//!
//! # Design
//!
//! - DashMap: sharded by row, reads of different rows never contend
//! - FxHashMap: O(1) column lookups, fast non-crypto hash
//! - Per-row shard: all columns of a row live together
//!
//! This table only holds committed state. Transactions stage their writes
//! elsewhere and publish them here at commit.

use cellstore_core::CellRecord;
use dashmap::DashMap;
use rustc_hash::FxHashMap;

/// All committed columns of one row
#[derive(Debug, Default)]
pub struct Shard {
    pub(crate) data: FxHashMap<String, CellRecord>,
}

impl Shard {
    /// Create a new empty shard
    pub fn new() -> Self {
        Self {
            data: FxHashMap::default(),
        }
    }

    /// Number of columns in this row
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if shard is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Committed cells, sharded by row id
#[derive(Debug, Default)]
pub struct ShardedCells {
    shards: DashMap<String, Shard>,
}

impl ShardedCells {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            shards: DashMap::new(),
        }
    }

    /// Committed state of a cell
    #[inline]
    pub fn get(&self, row_id: &str, column_name: &str) -> Option<CellRecord> {
        self.shards
            .get(row_id)
            .and_then(|shard| shard.data.get(column_name).cloned())
    }

    /// Committed version of a cell
    #[inline]
    pub fn version(&self, row_id: &str, column_name: &str) -> Option<u64> {
        self.shards
            .get(row_id)
            .and_then(|shard| shard.data.get(column_name).map(|c| c.version))
    }

    /// Check if a cell exists
    #[inline]
    pub fn contains(&self, row_id: &str, column_name: &str) -> bool {
        self.shards
            .get(row_id)
            .map(|shard| shard.data.contains_key(column_name))
            .unwrap_or(false)
    }

    /// Write a cell, replacing any previous state
    ///
    /// Only locks the target row's shard.
    #[inline]
    pub fn put(&self, record: CellRecord) {
        self.shards
            .entry(record.row_id.clone())
            .or_insert_with(Shard::new)
            .data
            .insert(record.column_name.clone(), record);
    }

    /// Number of rows that hold at least one cell
    pub fn row_count(&self) -> usize {
        self.shards.len()
    }

    /// Total number of cells across all rows
    pub fn total_cells(&self) -> usize {
        self.shards.iter().map(|entry| entry.value().len()).sum()
    }
}
