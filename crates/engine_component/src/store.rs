//! The component store: `(Entity, ComponentKind) → Component`.
//!
//! Storage is a single hash map keyed by entity and kind, so every lookup is
//! O(1) amortized. The store does not know which entities are alive; the
//! [`World`](crate::World) wraps it together with the entity registry and
//! enforces liveness.
//!
//! ## Render resources
//!
//! A [`RenderResource`] owns GPU handles, and the store has no graphics
//! context to delete them with. Whenever one leaves the store (removed,
//! replaced, or dropped with its entity) it is moved into a release queue.
//! The GPU resource binder drains that queue on the graphics thread, so each
//! handle is deleted exactly once.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::component::{Component, ComponentData, ComponentKind};
use crate::entity::Entity;
use crate::error::ComponentError;
use crate::kinds::RenderResource;

/// What [`ComponentStore::add_component`] does when the entity already has a
/// component of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Last write wins; the previous component is dropped.
    #[default]
    Replace,
    /// Keep the existing component and fail with
    /// [`ComponentError::DuplicateComponent`].
    Reject,
}

/// Type-erased component storage keyed by `(Entity, ComponentKind)`.
#[derive(Debug, Default)]
pub struct ComponentStore {
    components: HashMap<(Entity, ComponentKind), Component>,
    policy: DuplicatePolicy,
    /// Render resources waiting to have their handles deleted.
    released: Vec<RenderResource>,
}

impl ComponentStore {
    /// Create an empty store with the default [`DuplicatePolicy::Replace`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with an explicit duplicate policy.
    #[must_use]
    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// How a second component of the same kind is handled.
    #[must_use]
    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Change the duplicate policy for later additions.
    pub fn set_policy(&mut self, policy: DuplicatePolicy) {
        self.policy = policy;
    }

    /// Register a component under `(entity, component.kind())`.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::DuplicateComponent`] if the policy is
    /// [`DuplicatePolicy::Reject`] and the entity already has this kind.
    pub fn add_component(
        &mut self,
        entity: Entity,
        component: impl Into<Component>,
    ) -> Result<(), ComponentError> {
        let component = component.into();
        let kind = component.kind();
        match self.components.entry((entity, kind)) {
            Entry::Vacant(slot) => {
                slot.insert(component);
            }
            Entry::Occupied(mut slot) => match self.policy {
                DuplicatePolicy::Reject => {
                    return Err(ComponentError::DuplicateComponent { entity, kind });
                }
                DuplicatePolicy::Replace => {
                    trace!(%entity, %kind, "replacing component");
                    if let Component::RenderResource(old) = slot.insert(component) {
                        self.released.push(old);
                    }
                }
            },
        }
        Ok(())
    }

    /// Look up a component by kind. Absence is a normal outcome.
    #[must_use]
    pub fn get_component(&self, entity: Entity, kind: ComponentKind) -> Option<&Component> {
        self.components.get(&(entity, kind))
    }

    /// Mutable lookup by kind.
    #[must_use]
    pub fn get_component_mut(
        &mut self,
        entity: Entity,
        kind: ComponentKind,
    ) -> Option<&mut Component> {
        self.components.get_mut(&(entity, kind))
    }

    /// Typed lookup, e.g. `store.get::<Transform>(entity)`.
    #[must_use]
    pub fn get<T: ComponentData>(&self, entity: Entity) -> Option<&T> {
        self.get_component(entity, T::KIND)
            .and_then(T::from_component)
    }

    /// Typed mutable lookup.
    #[must_use]
    pub fn get_mut<T: ComponentData>(&mut self, entity: Entity) -> Option<&mut T> {
        self.get_component_mut(entity, T::KIND)
            .and_then(T::from_component_mut)
    }

    /// Whether `entity` has a component of `kind`.
    #[must_use]
    pub fn contains(&self, entity: Entity, kind: ComponentKind) -> bool {
        self.components.contains_key(&(entity, kind))
    }

    /// Delete the binding for `(entity, kind)`.
    ///
    /// Returns `false` if there was nothing to remove.
    pub fn remove_component(&mut self, entity: Entity, kind: ComponentKind) -> bool {
        match self.components.remove(&(entity, kind)) {
            Some(component) => {
                self.retire(component);
                true
            }
            None => false,
        }
    }

    /// Drop every component attached to `entity`. Returns how many were removed.
    pub fn remove_all_for(&mut self, entity: Entity) -> usize {
        let mut removed = 0;
        for &kind in ComponentKind::ALL {
            if self.remove_component(entity, kind) {
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(%entity, removed, "removed all components");
        }
        removed
    }

    /// Drop every component of `kind`, across all entities.
    pub fn remove_kind(&mut self, kind: ComponentKind) -> usize {
        let keys: Vec<_> = self
            .components
            .keys()
            .filter(|(_, k)| *k == kind)
            .copied()
            .collect();
        for (entity, kind) in &keys {
            self.remove_component(*entity, *kind);
        }
        keys.len()
    }

    /// Kinds currently attached to `entity`, in declaration order.
    #[must_use]
    pub fn kinds_of(&self, entity: Entity) -> Vec<ComponentKind> {
        ComponentKind::ALL
            .iter()
            .copied()
            .filter(|&kind| self.contains(entity, kind))
            .collect()
    }

    /// Entities from `order` that carry `kind`, preserving `order`.
    ///
    /// Cost is proportional to `order.len()`, not to the number of kinds.
    pub fn entities_with<'a>(
        &'a self,
        kind: ComponentKind,
        order: &'a [Entity],
    ) -> impl Iterator<Item = Entity> + 'a {
        order
            .iter()
            .copied()
            .filter(move |&entity| self.contains(entity, kind))
    }

    /// Total number of stored components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether no components are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Number of render resources waiting for their handles to be deleted.
    #[must_use]
    pub fn pending_releases(&self) -> usize {
        self.released.len()
    }

    /// Take ownership of every render resource that has left the store.
    pub fn drain_released(&mut self) -> Vec<RenderResource> {
        std::mem::take(&mut self.released)
    }

    fn retire(&mut self, component: Component) {
        if let Component::RenderResource(resource) = component {
            self.released.push(resource);
        }
    }
}

#[cfg(test)]
mod tests {
    use engine_math::{Transform, Vec3};

    use super::*;
    use crate::handle::{BufferHandle, VertexArrayHandle};
    use crate::kinds::{Camera, MeshId, Physics};

    fn resource(raw: u32) -> RenderResource {
        RenderResource::new(
            MeshId::new(),
            VertexArrayHandle::from_raw(raw),
            BufferHandle::from_raw(raw + 100),
            BufferHandle::from_raw(raw + 200),
            6,
        )
    }

    #[test]
    fn test_add_then_get_roundtrip() {
        let mut store = ComponentStore::new();
        let e = Entity::from_raw(1);
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        store.add_component(e, t).unwrap();
        assert_eq!(store.get::<Transform>(e), Some(&t));
        assert_eq!(
            store.get_component(e, ComponentKind::Transform),
            Some(&Component::Transform(t))
        );
    }

    #[test]
    fn test_absent_is_none() {
        let store = ComponentStore::new();
        assert!(store.get::<Camera>(Entity::from_raw(1)).is_none());
    }

    #[test]
    fn test_replace_policy_last_write_wins() {
        let mut store = ComponentStore::new();
        let e = Entity::from_raw(1);
        store.add_component(e, Physics::new(Vec3::ZERO, 1.0, false)).unwrap();
        store.add_component(e, Physics::new(Vec3::ONE, 2.0, true)).unwrap();
        assert_eq!(store.get::<Physics>(e).unwrap().mass, 2.0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_reject_policy_keeps_original() {
        let mut store = ComponentStore::with_policy(DuplicatePolicy::Reject);
        let e = Entity::from_raw(1);
        store.add_component(e, Physics::new(Vec3::ZERO, 1.0, false)).unwrap();
        let err = store
            .add_component(e, Physics::new(Vec3::ONE, 2.0, true))
            .unwrap_err();
        assert_eq!(
            err,
            ComponentError::DuplicateComponent {
                entity: e,
                kind: ComponentKind::Physics
            }
        );
        assert_eq!(store.get::<Physics>(e).unwrap().mass, 1.0);
    }

    #[test]
    fn test_remove_then_get_is_none() {
        let mut store = ComponentStore::new();
        let e = Entity::from_raw(1);
        store.add_component(e, Transform::IDENTITY).unwrap();
        assert!(store.remove_component(e, ComponentKind::Transform));
        assert!(store.get::<Transform>(e).is_none());
        assert!(!store.remove_component(e, ComponentKind::Transform));
    }

    #[test]
    fn test_remove_all_for_clears_every_kind() {
        let mut store = ComponentStore::new();
        let e = Entity::from_raw(1);
        let other = Entity::from_raw(2);
        store.add_component(e, Transform::IDENTITY).unwrap();
        store.add_component(e, Physics::new(Vec3::ZERO, 1.0, false)).unwrap();
        store.add_component(other, Transform::IDENTITY).unwrap();

        assert_eq!(store.remove_all_for(e), 2);
        for &kind in ComponentKind::ALL {
            assert!(store.get_component(e, kind).is_none());
        }
        assert!(store.get::<Transform>(other).is_some());
    }

    #[test]
    fn test_render_resource_queued_on_remove_and_replace() {
        let mut store = ComponentStore::new();
        let e = Entity::from_raw(1);
        store.add_component(e, resource(1)).unwrap();
        store.add_component(e, resource(2)).unwrap();
        assert_eq!(store.pending_releases(), 1);

        store.remove_all_for(e);
        let released = store.drain_released();
        let arrays: Vec<u32> = released.iter().map(|r| r.vertex_array().raw()).collect();
        assert_eq!(arrays, vec![1, 2]);
        assert_eq!(store.pending_releases(), 0);
    }

    #[test]
    fn test_entities_with_preserves_order() {
        let mut store = ComponentStore::new();
        let order: Vec<Entity> = (1..=5).map(Entity::from_raw).collect();
        for e in [order[3], order[0], order[2]] {
            store.add_component(e, Transform::IDENTITY).unwrap();
        }
        let found: Vec<Entity> = store
            .entities_with(ComponentKind::Transform, &order)
            .collect();
        assert_eq!(found, vec![order[0], order[2], order[3]]);
    }

    #[test]
    fn test_remove_kind() {
        let mut store = ComponentStore::new();
        store.add_component(Entity::from_raw(1), resource(1)).unwrap();
        store.add_component(Entity::from_raw(2), resource(2)).unwrap();
        store.add_component(Entity::from_raw(2), Transform::IDENTITY).unwrap();
        assert_eq!(store.remove_kind(ComponentKind::RenderResource), 2);
        assert_eq!(store.pending_releases(), 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_policy_serde() {
        let policy: DuplicatePolicy = serde_json::from_str("\"reject\"").unwrap();
        assert_eq!(policy, DuplicatePolicy::Reject);
    }
}
