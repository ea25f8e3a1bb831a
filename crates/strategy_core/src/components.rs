//! Entity identifiers, entity groups, and optional capability components.
//!
//! Components are pure data with no behavior. A structure, city or planet
//! may or may not carry each capability; an absent component means the
//! feature is not present, never an error.

use serde::{Deserialize, Serialize};

use crate::resources::WorldResource;

/// Unique identifier for entities within a stage.
pub type EntityId = u64;

/// Hands out entity ids for one stage. Ids are never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next: EntityId,
}

impl IdAllocator {
    /// Create an allocator whose first id is 1.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocate the next id.
    pub fn allocate(&mut self) -> EntityId {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Anything that can be registered into an [`EntityGroup`].
pub trait GroupMember {
    /// The member's entity id.
    fn id(&self) -> EntityId;
}

/// Per-stage collection of entities of one kind.
///
/// Members are kept in registration order. Nothing in the simulation relies
/// on that order: per-entity formulas never read another entity's state
/// from the same pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityGroup<T> {
    members: Vec<T>,
}

impl<T: GroupMember> EntityGroup<T> {
    /// Create an empty group.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            members: Vec::new(),
        }
    }

    /// Register a new member and return its id.
    pub fn register(&mut self, member: T) -> EntityId {
        let id = member.id();
        debug_assert!(!self.contains(id), "entity {id} registered twice");
        self.members.push(member);
        id
    }

    /// Remove a member (demolition, disbanding).
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        let index = self.members.iter().position(|m| m.id() == id)?;
        Some(self.members.remove(index))
    }

    /// Get a member by id.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.members.iter().find(|m| m.id() == id)
    }

    /// Get a mutable member by id.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.members.iter_mut().find(|m| m.id() == id)
    }

    /// Check if a member exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterate over members in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.members.iter()
    }

    /// Iterate mutably over members in registration order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.members.iter_mut()
    }
}

impl<T: GroupMember> Default for EntityGroup<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Housing capability: how many people an entity can shelter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Housing {
    /// Maximum residents.
    pub capacity: u32,
    /// Current residents.
    pub residents: u32,
}

impl Housing {
    /// Create empty housing with the given capacity.
    #[must_use]
    pub const fn new(capacity: u32) -> Self {
        Self {
            capacity,
            residents: 0,
        }
    }
}

/// Storage capability: contribution to the stage's container capacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Storage {
    /// Capacity added to the stage container.
    pub capacity: f32,
}

/// Fixed-rate production capability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Producer {
    /// Resource produced.
    pub resource: WorldResource,
    /// Amount produced per second of simulated time.
    pub rate: f32,
}

/// Research capability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Research {
    /// Research points generated per second.
    pub points_per_second: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Dummy(EntityId);

    impl GroupMember for Dummy {
        fn id(&self) -> EntityId {
            self.0
        }
    }

    #[test]
    fn test_id_allocator_never_repeats() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(), 1);
        assert_eq!(ids.allocate(), 2);
        assert_eq!(ids.allocate(), 3);
    }

    #[test]
    fn test_group_keeps_registration_order() {
        let mut group = EntityGroup::new();
        group.register(Dummy(5));
        group.register(Dummy(2));
        group.register(Dummy(9));

        let order: Vec<_> = group.iter().map(|d| d.0).collect();
        assert_eq!(order, vec![5, 2, 9]);
    }

    #[test]
    fn test_group_remove() {
        let mut group = EntityGroup::new();
        group.register(Dummy(1));
        group.register(Dummy(2));

        assert_eq!(group.remove(1), Some(Dummy(1)));
        assert!(group.remove(1).is_none());
        assert!(!group.contains(1));
        assert_eq!(group.len(), 1);
    }
}
