//! Entities: a model bound to its versioned identity

use crate::cell::Ref;
use crate::model::{Item, Model};

/// Object-safe view of an entity used by batches and the apply engine
///
/// Implemented by [`Entity`] for every [`Model`]; a batch can therefore mix
/// entities of different payload types.
pub trait Persist {
    /// Marshal the payload
    fn marshal(&self) -> Item;

    /// Identity and held version
    fn reference(&self) -> &Ref;

    /// Mutable identity; the engine rewrites version and updated_at only
    fn reference_mut(&mut self) -> &mut Ref;
}

/// A domain model persisted at a (row, column) cell
#[derive(Debug, Clone, PartialEq)]
pub struct Entity<M> {
    /// The payload
    pub model: M,
    /// Identity, version and timestamps
    pub reference: Ref,
}

impl<M: Model> Entity<M> {
    /// Entity for a cell that does not exist yet (version 0)
    pub fn new(row_id: impl Into<String>, column_name: impl Into<String>, model: M) -> Self {
        Self {
            model,
            reference: Ref::new(row_id, column_name),
        }
    }

    /// Entity for a cell previously read at `reference`
    pub fn existing(reference: Ref, model: M) -> Self {
        Self { model, reference }
    }

    /// Held version
    pub fn version(&self) -> u64 {
        self.reference.version
    }
}

impl<M: Model> Persist for Entity<M> {
    fn marshal(&self) -> Item {
        self.model.marshal()
    }

    fn reference(&self) -> &Ref {
        &self.reference
    }

    fn reference_mut(&mut self) -> &mut Ref {
        &mut self.reference
    }
}

impl<M> std::ops::Deref for Entity<M> {
    type Target = M;

    fn deref(&self) -> &M {
        &self.model
    }
}

impl<M> std::ops::DerefMut for Entity<M> {
    fn deref_mut(&mut self) -> &mut M {
        &mut self.model
    }
}
