//! World state: the entity registry and component store, kept consistent.
//!
//! The [`World`] is the single shared mutable resource of the engine. It is
//! owned by the engine loop and lent to systems and per-frame callbacks for
//! the duration of a call.

use tracing::debug;

use crate::component::{Component, ComponentData, ComponentKind};
use crate::entity::{Entity, EntityRegistry};
use crate::error::ComponentError;
use crate::store::{ComponentStore, DuplicatePolicy};

/// Entity registry plus component store.
///
/// Every query against a dead entity yields `None`; destroying an entity
/// drops all of its components in the same call, so no orphaned component
/// can outlive its entity.
#[derive(Debug, Default)]
pub struct World {
    registry: EntityRegistry,
    store: ComponentStore,
}

impl World {
    /// Create an empty world using [`DuplicatePolicy::Replace`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty world with an explicit duplicate-component policy.
    #[must_use]
    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            registry: EntityRegistry::new(),
            store: ComponentStore::with_policy(policy),
        }
    }

    // -- Entity lifecycle --

    /// Allocate a new entity with no components.
    pub fn spawn(&mut self) -> Entity {
        self.registry.new_entity()
    }

    /// Destroy an entity and every component attached to it.
    ///
    /// Returns `false` (and does nothing) if the entity is already dead.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        if !self.registry.destroy_entity(entity) {
            return false;
        }
        let removed = self.store.remove_all_for(entity);
        debug!(%entity, removed, "entity destroyed");
        true
    }

    /// Whether `entity` was spawned and not yet destroyed.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.registry.is_alive(entity)
    }

    /// Live entities in creation order.
    #[must_use]
    pub fn active_entities(&self) -> &[Entity] {
        self.registry.active_entities()
    }

    /// Number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.registry.len()
    }

    // -- Component operations --

    /// Attach a component to a live entity.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::EntityNotAlive`] for dead entities, or
    /// [`ComponentError::DuplicateComponent`] under the reject policy.
    pub fn add_component(
        &mut self,
        entity: Entity,
        component: impl Into<Component>,
    ) -> Result<(), ComponentError> {
        if !self.is_alive(entity) {
            return Err(ComponentError::EntityNotAlive(entity));
        }
        self.store.add_component(entity, component)
    }

    /// Look up a component of a live entity by kind.
    #[must_use]
    pub fn get_component(&self, entity: Entity, kind: ComponentKind) -> Option<&Component> {
        if !self.is_alive(entity) {
            return None;
        }
        self.store.get_component(entity, kind)
    }

    /// Typed lookup; `None` for dead entities.
    #[must_use]
    pub fn get<T: ComponentData>(&self, entity: Entity) -> Option<&T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.store.get::<T>(entity)
    }

    /// Typed mutable lookup; `None` for dead entities.
    #[must_use]
    pub fn get_mut<T: ComponentData>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.store.get_mut::<T>(entity)
    }

    /// Whether a live entity has a component of `kind`.
    #[must_use]
    pub fn has(&self, entity: Entity, kind: ComponentKind) -> bool {
        self.get_component(entity, kind).is_some()
    }

    /// Detach a component. Returns `false` if there was none.
    pub fn remove_component(&mut self, entity: Entity, kind: ComponentKind) -> bool {
        self.store.remove_component(entity, kind)
    }

    /// The first live entity (in creation order) carrying a `T`.
    #[must_use]
    pub fn first_with<T: ComponentData>(&self) -> Option<(Entity, &T)> {
        self.active_entities()
            .iter()
            .find_map(|&entity| self.store.get::<T>(entity).map(|c| (entity, c)))
    }

    /// Live entities carrying `kind`, in creation order.
    #[must_use]
    pub fn entities_with(&self, kind: ComponentKind) -> Vec<Entity> {
        self.store
            .entities_with(kind, self.registry.active_entities())
            .collect()
    }

    // -- Iteration --

    /// Visit every live entity with mutable access to the world.
    ///
    /// The live list is snapshotted when the pass starts. Entities destroyed
    /// by `f` before their turn are skipped; entities spawned by `f` are not
    /// visited until the next pass. No other entity is skipped or visited
    /// twice.
    pub fn for_each_entity(&mut self, mut f: impl FnMut(&mut World, Entity)) {
        let snapshot = self.registry.active_entities().to_vec();
        for entity in snapshot {
            if self.is_alive(entity) {
                f(self, entity);
            }
        }
    }

    // -- Store access --

    /// The underlying component store.
    #[must_use]
    pub fn store(&self) -> &ComponentStore {
        &self.store
    }

    /// Mutable access to the underlying component store.
    pub fn store_mut(&mut self) -> &mut ComponentStore {
        &mut self.store
    }
}
