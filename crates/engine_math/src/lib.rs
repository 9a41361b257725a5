//! # engine_math
//!
//! Math types for the render engine. Re-exports [`glam`] for linear algebra
//! and defines the engine's spatial value types.

pub mod transform;

// Re-export glam types for convenience.
pub use glam::{EulerRot, Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

pub use transform::Transform;
