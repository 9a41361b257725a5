//! Fly camera: WASD movement, mouse look and scroll zoom.

use tracing::debug;

use engine_component::{Camera, Entity};
use engine_graphics::Key;

use crate::context::FrameContext;
use crate::input::{ActionId, InputManager};

/// Narrowest field of view scroll zoom allows, in degrees.
pub const MIN_FIELD_OF_VIEW: f32 = 1.0;
/// Widest field of view scroll zoom allows, in degrees.
pub const MAX_FIELD_OF_VIEW: f32 = 45.0;

/// Action ids registered by [`FlyCamera::install`].
pub mod actions {
    use super::ActionId;

    pub const MOVE_FORWARD: ActionId = 1;
    pub const MOVE_BACKWARD: ActionId = 2;
    pub const STRAFE_RIGHT: ActionId = 3;
    pub const STRAFE_LEFT: ActionId = 4;
}

/// Direction of a movement key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Forward,
    Backward,
    Right,
    Left,
}

/// Move `camera` for one frame. The distance is `speed * delta_time`.
pub fn move_camera(camera: &mut Camera, movement: Movement, speed: f32, delta_time: f32) {
    let direction = match movement {
        Movement::Forward => camera.front,
        Movement::Backward => -camera.front,
        Movement::Right => camera.right,
        Movement::Left => -camera.right,
    };
    camera.translate(direction, speed * delta_time);
}

/// Field of view after scrolling by `dy`.
#[must_use]
pub fn zoom(field_of_view: f32, dy: f32) -> f32 {
    (field_of_view - dy).clamp(MIN_FIELD_OF_VIEW, MAX_FIELD_OF_VIEW)
}

/// Turns absolute cursor positions into look offsets.
#[derive(Debug, Clone, Copy, Default)]
pub struct MouseLook {
    last: Option<(f64, f64)>,
}

impl MouseLook {
    /// Offsets since the previous position, as `(yaw, pitch)`. The first
    /// position only primes the tracker and yields `(0, 0)`. Moving the
    /// cursor up pitches the camera up.
    pub fn offsets(&mut self, x: f64, y: f64) -> (f32, f32) {
        let (last_x, last_y) = self.last.unwrap_or((x, y));
        self.last = Some((x, y));
        ((x - last_x) as f32, (last_y - y) as f32)
    }
}

/// Binds a camera entity to keyboard, mouse and scroll input.
#[derive(Debug, Clone, Copy)]
pub struct FlyCamera {
    pub camera: Entity,
    /// World units per second.
    pub speed: f32,
    /// Degrees per pixel of cursor movement.
    pub sensitivity: f32,
}

impl FlyCamera {
    #[must_use]
    pub fn new(camera: Entity) -> Self {
        Self {
            camera,
            speed: 1.0,
            sensitivity: 0.05,
        }
    }

    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    #[must_use]
    pub fn with_sensitivity(mut self, sensitivity: f32) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    /// Register the movement keys, mouse look and scroll zoom on `input`.
    pub fn install(self, input: &mut InputManager) {
        let bindings = [
            (Key::W, actions::MOVE_FORWARD, Movement::Forward),
            (Key::S, actions::MOVE_BACKWARD, Movement::Backward),
            (Key::D, actions::STRAFE_RIGHT, Movement::Right),
            (Key::A, actions::STRAFE_LEFT, Movement::Left),
        ];
        for (key, action, movement) in bindings {
            input.register_key_action(key, action, move |ctx: &mut FrameContext<'_>| {
                let delta_time = ctx.delta_time;
                if let Some(camera) = ctx.world.get_mut::<Camera>(self.camera) {
                    move_camera(camera, movement, self.speed, delta_time);
                }
            });
        }

        let mut look = MouseLook::default();
        input.register_mouse_move_handler(move |ctx, x, y| {
            let (yaw, pitch) = look.offsets(x, y);
            if let Some(camera) = ctx.world.get_mut::<Camera>(self.camera) {
                camera.rotate(yaw * self.sensitivity, pitch * self.sensitivity);
            }
        });

        input.register_mouse_scroll_handler(move |ctx, _, dy| {
            if let Some(camera) = ctx.world.get_mut::<Camera>(self.camera) {
                camera.field_of_view = zoom(camera.field_of_view, dy as f32);
            }
        });

        debug!(camera = %self.camera, "fly camera installed");
    }
}
