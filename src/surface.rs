//! The rendering surface a spawner mutates: an ordered container that accepts
//! appends and removals. [`MemorySurface`] is the headless implementation used
//! by the tests and by anything that wants to drive the spawner off-DOM.

use crate::entity::{EndTransform, Entity, EntityId};
use crate::error::Result;

pub trait Surface {
    /// Make the entity visible in its initial state.
    fn append(&mut self, entity: &Entity) -> Result<()>;

    /// Move an entity into its end-state. Unknown ids are ignored.
    fn apply_end_state(&mut self, id: EntityId, end: &EndTransform);

    /// Remove an entity. Returns `false` if it was not present.
    fn remove(&mut self, id: EntityId) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Entry in a [`MemorySurface`].
#[derive(Clone, Debug, PartialEq)]
pub struct Placed {
    pub entity: Entity,
    pub end_applied: bool,
}

/// In-memory surface keeping entities in append order.
#[derive(Debug, Default)]
pub struct MemorySurface {
    placed: Vec<Placed>,
    appended_total: usize,
    removed_total: usize,
    reject_appends: bool,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entities(&self) -> impl Iterator<Item = &Placed> {
        self.placed.iter()
    }

    pub fn get(&self, id: EntityId) -> Option<&Placed> {
        self.placed.iter().find(|p| p.entity.id == id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Entities appended over the surface's whole life.
    pub fn appended_total(&self) -> usize {
        self.appended_total
    }

    pub fn removed_total(&self) -> usize {
        self.removed_total
    }

    /// Make subsequent appends fail, to exercise batch failure isolation.
    pub fn set_reject_appends(&mut self, reject: bool) {
        self.reject_appends = reject;
    }
}

impl Surface for MemorySurface {
    fn append(&mut self, entity: &Entity) -> Result<()> {
        if self.reject_appends {
            return Err(crate::SpawnError::surface(format!("append of {} rejected", entity.id)));
        }
        self.placed.push(Placed { entity: entity.clone(), end_applied: false });
        self.appended_total += 1;
        Ok(())
    }

    fn apply_end_state(&mut self, id: EntityId, _end: &EndTransform) {
        if let Some(p) = self.placed.iter_mut().find(|p| p.entity.id == id) {
            p.end_applied = true;
        }
    }

    fn remove(&mut self, id: EntityId) -> bool {
        match self.placed.iter().position(|p| p.entity.id == id) {
            Some(idx) => {
                self.placed.remove(idx);
                self.removed_total += 1;
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.placed.len()
    }
}
