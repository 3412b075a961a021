//! Action log writer
//!
//! Records that a named operation ran with given parameters. The write goes
//! straight to the store, outside any apply scope: a log failure never rolls
//! back an apply, and a log entry is no proof that an apply committed.

use crate::engine::Engine;
use cellstore_core::{ActionParams, ActionRecord, Result};
use cellstore_storage::Store;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

/// Build the log entry for `name` invoked with `params`
pub fn action_record(name: &str, params: &ActionParams) -> Result<ActionRecord> {
    Ok(ActionRecord {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        params: serde_json::to_vec(&params.data)?,
        created_at: Utc::now(),
    })
}

impl<S: Store> Engine<S> {
    /// Append an action log entry and return it
    pub fn write_log(&self, name: &str, params: &ActionParams) -> Result<ActionRecord> {
        let record = action_record(name, params)?;
        self.store.append_action(&record)?;
        debug!(id = %record.id, name, "action logged");
        Ok(record)
    }

    /// Fetch an action log entry by id
    pub fn action(&self, id: &str) -> Result<Option<ActionRecord>> {
        self.store.get_action(id)
    }
}
