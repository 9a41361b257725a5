//! Entity type and the entity registry.
//!
//! An [`Entity`] is a lightweight `u64` identifier with no inherent data.
//! The [`EntityRegistry`] hands out identifiers and tracks which ones are
//! alive, in creation order.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A unique entity identifier.
///
/// Entities are pure identifiers and carry no data of their own. Components
/// are attached to entities to give them meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity(pub u64);

impl Entity {
    /// The null / invalid entity sentinel.
    pub const INVALID: Entity = Entity(0);

    /// Create an entity from a raw `u64` identifier.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Returns `true` if this is a valid (non-zero) entity.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Allocates monotonically increasing entity IDs.
///
/// IDs are never recycled, so a stale [`Entity`] can never alias a newer one.
#[derive(Debug)]
pub struct EntityAllocator {
    next_id: u64,
}

impl EntityAllocator {
    /// Creates a new allocator. IDs start at 1 (0 is reserved for [`Entity::INVALID`]).
    #[must_use]
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Allocates a fresh entity ID.
    pub fn allocate(&mut self) -> Entity {
        let id = self.next_id;
        self.next_id += 1;
        Entity(id)
    }

    /// Returns the number of entities allocated so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.next_id - 1
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks the set of live entities.
///
/// The live list is kept in creation order. Because IDs only ever grow, that
/// order is also ascending ID order, which lets destruction find an entity
/// with a binary search instead of a scan.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    allocator: EntityAllocator,
    /// Live entities in creation order.
    live: Vec<Entity>,
    /// Membership index for O(1) liveness checks.
    alive: HashSet<Entity>,
}

impl EntityRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh, never-reused entity and mark it live.
    pub fn new_entity(&mut self) -> Entity {
        let entity = self.allocator.allocate();
        self.live.push(entity);
        self.alive.insert(entity);
        entity
    }

    /// Remove an entity from the live set.
    ///
    /// Returns `false` if the entity was already dead or never existed.
    /// Destroying twice is a no-op.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        if !self.alive.remove(&entity) {
            return false;
        }
        if let Ok(pos) = self.live.binary_search(&entity) {
            self.live.remove(pos);
        }
        true
    }

    /// Returns `true` if the entity is currently alive.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.alive.contains(&entity)
    }

    /// All live entities, in creation order.
    #[must_use]
    pub fn active_entities(&self) -> &[Entity] {
        &self.live
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Returns `true` if no entity is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Total number of entities ever allocated by this registry.
    #[must_use]
    pub fn allocated(&self) -> u64 {
        self.allocator.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_creation() {
        let e = Entity::from_raw(42);
        assert_eq!(e.id(), 42);
        assert!(e.is_valid());
    }

    #[test]
    fn test_entity_invalid() {
        assert!(!Entity::INVALID.is_valid());
        assert_eq!(Entity::INVALID.id(), 0);
    }

    #[test]
    fn test_allocator_produces_unique_ids() {
        let mut alloc = EntityAllocator::new();
        let e1 = alloc.allocate();
        let e2 = alloc.allocate();
        let e3 = alloc.allocate();
        assert_eq!(e1.id(), 1);
        assert_eq!(e2.id(), 2);
        assert_eq!(e3.id(), 3);
        assert_eq!(alloc.count(), 3);
    }

    #[test]
    fn test_registry_creation_order() {
        let mut reg = EntityRegistry::new();
        let a = reg.new_entity();
        let b = reg.new_entity();
        let c = reg.new_entity();
        assert_eq!(reg.active_entities(), &[a, b, c]);
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut reg = EntityRegistry::new();
        let a = reg.new_entity();
        let b = reg.new_entity();
        assert!(reg.destroy_entity(a));
        assert!(!reg.destroy_entity(a));
        assert!(!reg.destroy_entity(Entity::from_raw(99)));
        assert_eq!(reg.active_entities(), &[b]);
        assert!(!reg.is_alive(a));
    }

    #[test]
    fn test_ids_never_reused() {
        let mut reg = EntityRegistry::new();
        let a = reg.new_entity();
        reg.destroy_entity(a);
        let b = reg.new_entity();
        assert_ne!(a, b);
        assert_eq!(reg.allocated(), 2);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_mixed_sequence_never_lists_dead_or_duplicates() {
        let mut reg = EntityRegistry::new();
        let mut created = Vec::new();
        for step in 0..200u64 {
            if step % 3 == 2 {
                // Destroy every other previously created entity, sometimes twice.
                let target = created[(step as usize * 7) % created.len()];
                reg.destroy_entity(target);
            } else {
                created.push(reg.new_entity());
            }

            let live = reg.active_entities();
            let unique: HashSet<_> = live.iter().collect();
            assert_eq!(unique.len(), live.len());
            assert!(live.iter().all(|e| reg.is_alive(*e)));
            assert!(live.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_entity_serialization_roundtrip() {
        let entity = Entity::from_raw(999);
        let json = serde_json::to_string(&entity).unwrap();
        let restored: Entity = serde_json::from_str(&json).unwrap();
        assert_eq!(entity, restored);
    }
}
