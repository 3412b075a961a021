//! Apply engine for cellstore
//!
//! This crate turns staged change sets into atomic store transactions:
//! - Engine: single-cell reads and typed loads
//! - apply_changes: all-or-nothing batch apply with per-cell version checks
//! - write_log: action log writer, outside the apply scope
//! - run_action: stage, apply and log a named action

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod action;
pub mod action_log;
mod apply;
pub mod engine;

pub use action::{Action, ActionOutcome};
pub use action_log::action_record;
pub use engine::Engine;
