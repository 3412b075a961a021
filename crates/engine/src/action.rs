//! Actions: named units of work that stage a batch
//!
//! `run_action` stages the action's changes, applies them atomically, and
//! then writes the action log best-effort. The log entry is written only
//! after the apply committed; a failed log write is reported with
//! `tracing::warn!` and leaves the committed apply in place.

use crate::engine::Engine;
use cellstore_core::{ActionParams, ActionRecord, Batch, Result};
use cellstore_storage::Store;
use tracing::warn;

/// A named operation that stages writes into a batch
pub trait Action {
    /// Name recorded in the action log
    fn name(&self) -> &str;

    /// Stage this action's changes
    ///
    /// Entities staged into `batch` are borrowed from the action itself, so
    /// their advanced versions are visible on the action after the run.
    fn exec<'a>(&'a mut self, params: &ActionParams, batch: &mut Batch<'a>) -> Result<()>;
}

/// Result of a successful [`Engine::run_action`]
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    /// Number of changes applied
    pub changes: usize,
    /// Log entry, or `None` if the log write failed
    pub log: Option<ActionRecord>,
}

impl<S: Store> Engine<S> {
    /// Stage, apply and log an action
    ///
    /// Returns the apply error unchanged if staging or applying fails; no
    /// log entry is written in that case.
    pub fn run_action<A: Action + ?Sized>(
        &self,
        action: &mut A,
        params: &ActionParams,
    ) -> Result<ActionOutcome> {
        let name = action.name().to_string();

        let changes = {
            let mut batch = Batch::new();
            action.exec(params, &mut batch)?;
            let staged = batch.len();
            self.apply_changes(&mut batch)?;
            staged
        };

        let log = match self.write_log(&name, params) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(action = %name, error = %e, "action applied but log write failed");
                None
            }
        };

        Ok(ActionOutcome { changes, log })
    }
}
