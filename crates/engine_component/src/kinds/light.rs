//! Light components. These only hold data; shading is the shader's job.

use engine_math::Vec3;
use serde::{Deserialize, Serialize};

/// Uniform light applied to every surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientLight {
    /// Linear RGB color.
    pub color: Vec3,
    /// Scalar multiplier on `color`.
    pub intensity: f32,
}

impl AmbientLight {
    #[must_use]
    pub fn new(color: Vec3, intensity: f32) -> Self {
        Self { color, intensity }
    }
}

/// Light arriving from a single direction, like the sun.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    /// Direction the light travels in.
    pub direction: Vec3,
    /// Linear RGB color.
    pub color: Vec3,
    /// Scalar multiplier on `color`.
    pub intensity: f32,
}

impl DirectionalLight {
    #[must_use]
    pub fn new(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            direction,
            color,
            intensity,
        }
    }
}

/// Omnidirectional light with distance attenuation
/// `1 / (constant + linear·d + quadratic·d²)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    /// World-space position.
    pub position: Vec3,
    /// Linear RGB color.
    pub color: Vec3,
    /// Scalar multiplier on `color`.
    pub intensity: f32,
    /// Constant attenuation term.
    pub constant: f32,
    /// Linear attenuation term.
    pub linear: f32,
    /// Quadratic attenuation term.
    pub quadratic: f32,
}

impl PointLight {
    #[must_use]
    pub fn new(
        position: Vec3,
        color: Vec3,
        intensity: f32,
        constant: f32,
        linear: f32,
        quadratic: f32,
    ) -> Self {
        Self {
            position,
            color,
            intensity,
            constant,
            linear,
            quadratic,
        }
    }

    /// Attenuation factor at `distance` from the light.
    #[must_use]
    pub fn attenuation(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }
}
