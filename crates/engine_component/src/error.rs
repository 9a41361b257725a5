//! Component-layer error types.

use crate::component::ComponentKind;
use crate::entity::Entity;

/// Errors raised by the component store and component factories.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComponentError {
    /// The entity was destroyed or never allocated.
    #[error("{0} is not alive")]
    EntityNotAlive(Entity),

    /// The store is configured to reject a second component of the same kind.
    #[error("{entity} already has a {kind} component")]
    DuplicateComponent {
        /// The entity that already holds a component of this kind.
        entity: Entity,
        /// The kind that was added twice.
        kind: ComponentKind,
    },

    /// A mesh index references a vertex that does not exist.
    #[error("index {index} out of bounds for {vertex_count} vertices")]
    IndexOutOfBounds {
        /// The offending index value.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },
}
