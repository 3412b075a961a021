//! Change sets
//!
//! A [`Batch`] stages writes without touching a store. Nothing is validated
//! at staging time: marshaling and version checks happen when the batch is
//! applied.
//!
//! ## Ordering
//!
//! [`Batch::items`] yields every add before every update, each group in
//! staging order. Staging two changes for the same (row, column) in one
//! batch is unsupported; the engine does not deduplicate.

use crate::entity::Persist;

/// Kind of a staged write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    /// Insert a new cell
    Add,
    /// Version-checked update of an existing cell
    Update,
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeType::Add => write!(f, "add"),
            ChangeType::Update => write!(f, "update"),
        }
    }
}

/// One staged write, borrowing its entity from the batch
pub struct Change<'b> {
    /// Entity being written
    pub entity: &'b mut dyn Persist,
    /// Write kind
    pub kind: ChangeType,
}

impl std::fmt::Debug for Change<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Change")
            .field("reference", self.entity.reference())
            .field("kind", &self.kind)
            .finish()
    }
}

/// Ordered set of entities to add and entities to update
///
/// The batch borrows its entities mutably for `'a`: the engine advances the
/// version of updated entities in place, and the caller gets them back once
/// the batch is dropped.
#[derive(Default)]
pub struct Batch<'a> {
    add: Vec<&'a mut dyn Persist>,
    update: Vec<&'a mut dyn Persist>,
}

impl<'a> Batch<'a> {
    /// Empty batch
    pub fn new() -> Self {
        Self {
            add: Vec::new(),
            update: Vec::new(),
        }
    }

    /// Stage a new cell
    pub fn add(&mut self, entity: &'a mut dyn Persist) -> &mut Self {
        self.add.push(entity);
        self
    }

    /// Stage an update of an existing cell at the entity's held version
    pub fn update(&mut self, entity: &'a mut dyn Persist) -> &mut Self {
        self.update.push(entity);
        self
    }

    /// All staged changes: adds first, then updates, in staging order
    pub fn items(&mut self) -> Vec<Change<'_>> {
        let mut changes = Vec::with_capacity(self.len());
        for entity in self.add.iter_mut() {
            changes.push(Change {
                entity: &mut **entity,
                kind: ChangeType::Add,
            });
        }
        for entity in self.update.iter_mut() {
            changes.push(Change {
                entity: &mut **entity,
                kind: ChangeType::Update,
            });
        }
        changes
    }

    /// Total number of staged changes
    pub fn len(&self) -> usize {
        self.add.len() + self.update.len()
    }

    /// True when nothing is staged
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.update.is_empty()
    }

    /// Number of staged adds
    pub fn add_count(&self) -> usize {
        self.add.len()
    }

    /// Number of staged updates
    pub fn update_count(&self) -> usize {
        self.update.len()
    }
}

impl std::fmt::Debug for Batch<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Batch")
            .field("add", &self.add.len())
            .field("update", &self.update.len())
            .finish()
    }
}
