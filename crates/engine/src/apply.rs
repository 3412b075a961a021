//! Transactional batch apply
//!
//! ## Apply Sequence
//!
//! ```text
//! 1. begin() - open one atomic scope (engine isolation, read-write)
//! 2. for each change in batch.items():
//!      Add    → marshal, insert(row, column, version, data, timestamps)
//!      Update → marshal, update ... WHERE row, column AND version = held
//!               rows affected: 1 → advance held version
//!                              0 → OptimisticLock
//!                             >1 → Invariant (never absorbed)
//! 3. commit() - only when every change succeeded
//! ```
//!
//! Any error drops the scope, which rolls it back: no part of a failed
//! batch is ever visible. Nothing is retried here; callers that hit
//! `OptimisticLock` re-read and build a new batch.
//!
//! Entities whose held version was advanced during a failed apply get
//! their previous reference back, so they still describe committed state.

use crate::engine::Engine;
use cellstore_core::{Batch, Change, ChangeType, Error, Persist, Ref, Result};
use cellstore_storage::{CellUpdate, NewCell, Store, StoreTxn};
use chrono::Utc;
use tracing::{debug, error, warn};

impl<S: Store> Engine<S> {
    /// Apply every change of `batch` atomically
    ///
    /// # Errors
    ///
    /// - `Error::Marshal`: a model could not produce its payload
    /// - `Error::DuplicateKey` / `Error::Store`: the store refused a write
    /// - `Error::OptimisticLock`: an update held a stale version
    /// - `Error::Invariant`: an update touched more than one row
    pub fn apply_changes(&self, batch: &mut Batch<'_>) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let adds = batch.add_count();
        let updates = batch.update_count();
        debug!(adds, updates, "applying batch");

        let mut txn = self.store.begin(self.options)?;
        let mut changes = batch.items();
        let mut advanced: Vec<(usize, Ref)> = Vec::new();

        if let Err(e) = apply_all(&mut txn, &mut changes, &mut advanced) {
            drop(txn);
            restore(&mut changes, advanced);
            debug!(adds, updates, error = %e, "batch rolled back");
            return Err(e);
        }

        if let Err(e) = txn.commit() {
            restore(&mut changes, advanced);
            if e.is_optimistic_lock() {
                warn!(error = %e, "batch lost commit race");
            }
            return Err(e);
        }

        debug!(adds, updates, "batch committed");
        Ok(())
    }
}

fn apply_all<T: StoreTxn>(
    txn: &mut T,
    changes: &mut [Change<'_>],
    advanced: &mut Vec<(usize, Ref)>,
) -> Result<()> {
    for (i, change) in changes.iter_mut().enumerate() {
        match change.kind {
            ChangeType::Add => apply_add(txn, &*change.entity)?,
            ChangeType::Update => {
                let before = change.entity.reference().clone();
                apply_update(txn, &mut *change.entity)?;
                advanced.push((i, before));
            }
        }
    }
    Ok(())
}

fn restore(changes: &mut [Change<'_>], advanced: Vec<(usize, Ref)>) {
    for (i, before) in advanced {
        if let Some(change) = changes.get_mut(i) {
            *change.entity.reference_mut() = before;
        }
    }
}

/// Marshal an entity, turning a carried error into `Error::Marshal`
fn marshal(entity: &dyn Persist) -> Result<Vec<u8>> {
    entity.marshal().into_result().map_err(|e| {
        let reference = entity.reference();
        Error::Marshal {
            row: reference.row_id.clone(),
            column: reference.column_name.clone(),
            message: e.to_string(),
        }
    })
}

fn apply_add<T: StoreTxn>(txn: &mut T, entity: &dyn Persist) -> Result<()> {
    let reference = entity.reference();
    if reference.version != 0 {
        return Err(Error::Invariant(format!(
            "new cell {} must start at version 0",
            reference
        )));
    }
    let data = marshal(entity)?;
    txn.insert(NewCell {
        row_id: &reference.row_id,
        column_name: &reference.column_name,
        version: reference.version,
        data: &data,
        created_at: reference.created_at,
        updated_at: reference.updated_at,
    })
}

fn apply_update<T: StoreTxn>(txn: &mut T, entity: &mut dyn Persist) -> Result<()> {
    let data = marshal(entity)?;
    let now = Utc::now();

    let reference = entity.reference();
    let update = CellUpdate {
        row_id: &reference.row_id,
        column_name: &reference.column_name,
        expected_version: reference.version,
        data: &data,
        updated_at: now,
    };
    let next_version = update.next_version()?;

    match txn.update_if_version(update)? {
        1 => {
            let reference = entity.reference_mut();
            reference.version = next_version;
            reference.updated_at = now;
            Ok(())
        }
        0 => {
            warn!(cell = %reference, "optimistic lock conflict");
            Err(Error::OptimisticLock {
                row: reference.row_id.clone(),
                column: reference.column_name.clone(),
                version: reference.version,
            })
        }
        affected => {
            error!(cell = %reference, affected, "conditional update touched more than one row");
            Err(Error::more_than_one_updated(
                &reference.row_id,
                &reference.column_name,
                affected,
            ))
        }
    }
}
