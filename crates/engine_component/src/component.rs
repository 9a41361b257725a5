//! The closed set of component kinds and the [`Component`] tagged union.
//!
//! Every component the engine stores is one variant of [`Component`]. The
//! store is keyed by [`ComponentKind`], so retrieval dispatches on the tag
//! rather than on runtime type inspection. Typed access goes through the
//! [`ComponentData`] trait, implemented once per variant payload.

use serde::{Deserialize, Serialize};

use engine_math::Transform;

use crate::kinds::{
    AmbientLight, Camera, DirectionalLight, Material, Mesh, Physics, PointLight, RenderResource,
};

macro_rules! component_kinds {
    ($($variant:ident => $ty:ty, $name:literal;)*) => {
        /// Tag identifying which kind of data a [`Component`] carries.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum ComponentKind {
            $(
                #[doc = concat!("Tag for [`", stringify!($ty), "`].")]
                $variant,
            )*
        }

        impl ComponentKind {
            /// Every kind, in declaration order.
            pub const ALL: &'static [ComponentKind] = &[$(ComponentKind::$variant),*];

            /// Human-readable name of the kind.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(ComponentKind::$variant => $name,)*
                }
            }
        }

        /// A component value. One variant per [`ComponentKind`].
        #[derive(Debug, PartialEq)]
        pub enum Component {
            $(
                #[allow(missing_docs)]
                $variant($ty),
            )*
        }

        impl Component {
            /// The kind tag of this component.
            #[must_use]
            pub const fn kind(&self) -> ComponentKind {
                match self {
                    $(Component::$variant(_) => ComponentKind::$variant,)*
                }
            }
        }

        $(
            impl From<$ty> for Component {
                fn from(value: $ty) -> Self {
                    Component::$variant(value)
                }
            }

            impl ComponentData for $ty {
                const KIND: ComponentKind = ComponentKind::$variant;

                fn from_component(component: &Component) -> Option<&Self> {
                    match component {
                        Component::$variant(value) => Some(value),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }

                fn from_component_mut(component: &mut Component) -> Option<&mut Self> {
                    match component {
                        Component::$variant(value) => Some(value),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }
            }
        )*
    };
}

/// Typed view over one [`Component`] variant.
///
/// Implemented for every variant payload so systems can write
/// `world.get::<Transform>(entity)` instead of matching on the enum.
pub trait ComponentData: Into<Component> + 'static {
    /// The kind tag this payload is stored under.
    const KIND: ComponentKind;

    /// Borrow the payload if `component` is of this kind.
    fn from_component(component: &Component) -> Option<&Self>;

    /// Mutably borrow the payload if `component` is of this kind.
    fn from_component_mut(component: &mut Component) -> Option<&mut Self>;
}

component_kinds! {
    Transform => Transform, "Transform";
    Camera => Camera, "Camera";
    Mesh => Mesh, "Mesh";
    Material => Material, "Material";
    RenderResource => RenderResource, "RenderResource";
    AmbientLight => AmbientLight, "AmbientLight";
    DirectionalLight => DirectionalLight, "DirectionalLight";
    PointLight => PointLight, "PointLight";
    Physics => Physics, "Physics";
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use engine_math::Vec3;

    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        let c: Component = Transform::IDENTITY.into();
        assert_eq!(c.kind(), ComponentKind::Transform);

        let c: Component = AmbientLight::new(Vec3::ONE, 0.2).into();
        assert_eq!(c.kind(), ComponentKind::AmbientLight);
    }

    #[test]
    fn test_typed_access_dispatches_on_tag() {
        let c: Component = Physics::new(Vec3::ZERO, 1.0, false).into();
        assert!(Physics::from_component(&c).is_some());
        assert!(Transform::from_component(&c).is_none());
    }

    #[test]
    fn test_all_kinds_are_distinct() {
        let mut kinds = ComponentKind::ALL.to_vec();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), 9);
        assert_eq!(<Mesh as ComponentData>::KIND, ComponentKind::Mesh);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ComponentKind::RenderResource.to_string(), "RenderResource");
    }
}
