//! Physics body data. No simulation runs against it inside the engine core.

use engine_math::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Physics {
    /// Linear velocity in world units per second.
    pub velocity: Vec3,
    pub mass: f32,
    /// Static bodies never move.
    pub is_static: bool,
}

impl Physics {
    #[must_use]
    pub fn new(velocity: Vec3, mass: f32, is_static: bool) -> Self {
        Self {
            velocity,
            mass,
            is_static,
        }
    }
}
