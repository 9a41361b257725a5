//! Per-frame context handed to frame callbacks and input handlers.

use engine_component::World;

/// Mutable view of the engine for the duration of one frame.
#[derive(Debug)]
pub struct FrameContext<'a> {
    /// The world being simulated and rendered.
    pub world: &'a mut World,
    /// Seconds since the previous frame.
    pub delta_time: f32,
    /// Number of frames presented before this one.
    pub frame: u64,
    shutdown: &'a mut bool,
}

impl<'a> FrameContext<'a> {
    #[must_use]
    pub fn new(world: &'a mut World, delta_time: f32, frame: u64, shutdown: &'a mut bool) -> Self {
        Self {
            world,
            delta_time,
            frame,
            shutdown,
        }
    }

    /// Ask the engine to stop after the current frame.
    pub fn request_shutdown(&mut self) {
        *self.shutdown = true;
    }

    #[must_use]
    pub fn shutdown_requested(&self) -> bool {
        *self.shutdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shutdown_sets_flag() {
        let mut world = World::new();
        let mut flag = false;
        let mut ctx = FrameContext::new(&mut world, 0.016, 3, &mut flag);
        assert!(!ctx.shutdown_requested());
        ctx.request_shutdown();
        assert!(ctx.shutdown_requested());
        assert!(flag);
    }
}
