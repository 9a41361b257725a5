//! Perspective camera component.

use engine_math::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Pitch is held strictly inside ±90° so the basis never degenerates.
const PITCH_LIMIT: f32 = 89.0;

/// A free-look perspective camera.
///
/// Angles are stored in degrees. The `front`/`right`/`up` basis is derived
/// from `yaw`, `pitch` and `world_up` and recomputed whenever the angles
/// change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// World-space eye position.
    pub position: Vec3,
    /// Unit view direction.
    pub front: Vec3,
    /// Unit camera-space up vector.
    pub up: Vec3,
    /// Unit camera-space right vector.
    pub right: Vec3,
    /// The world's up axis, usually +Y.
    pub world_up: Vec3,
    /// Heading in degrees; -90 looks down -Z.
    pub yaw: f32,
    /// Elevation in degrees.
    pub pitch: f32,
    /// Vertical field of view in degrees.
    pub field_of_view: f32,
    /// Viewport width divided by height.
    pub aspect_ratio: f32,
    /// Near clipping plane distance.
    pub near: f32,
    /// Far clipping plane distance.
    pub far: f32,
}

impl Camera {
    /// Build a camera and derive its basis vectors.
    ///
    /// No range checks are applied; the field of view in particular is
    /// clamped by whichever controller drives the camera.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        position: Vec3,
        world_up: Vec3,
        yaw: f32,
        pitch: f32,
        field_of_view: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: world_up,
            right: Vec3::X,
            world_up,
            yaw,
            pitch,
            field_of_view,
            aspect_ratio,
            near,
            far,
        };
        camera.update_vectors();
        camera
    }

    /// Move the eye along `direction` by `amount` world units.
    pub fn translate(&mut self, direction: Vec3, amount: f32) {
        self.position += direction * amount;
    }

    /// Turn the camera by the given yaw and pitch offsets, in degrees.
    pub fn rotate(&mut self, yaw_offset: f32, pitch_offset: f32) {
        self.yaw += yaw_offset;
        self.pitch = (self.pitch + pitch_offset).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    /// World-to-view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// View-to-clip matrix using OpenGL depth conventions.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(
            self.field_of_view.to_radians(),
            self.aspect_ratio,
            self.near,
            self.far,
        )
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
            .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}
