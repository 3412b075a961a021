//! Core types for cellstore
//!
//! This crate defines the data model shared by every layer:
//! - [`Ref`]: identity, version and timestamps of a stored cell
//! - [`Model`] and [`Item`]: the payload capability contract
//! - [`Entity`]: a model bound to its [`Ref`]
//! - [`Batch`] and [`Change`]: a staged change set
//! - [`Error`]: the error taxonomy used by storage and engine

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod action;
pub mod batch;
pub mod cell;
pub mod entity;
pub mod error;
pub mod model;

pub use action::{ActionParams, ActionRecord};
pub use batch::{Batch, Change, ChangeType};
pub use cell::{CellRecord, Ref};
pub use entity::{Entity, Persist};
pub use error::{Error, Result};
pub use model::{Item, JsonModel, Model};
