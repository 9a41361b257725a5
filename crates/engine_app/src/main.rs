//! # engine_app — rotating cubes
//!
//! Spawns a camera, a few lights and ten cubes and spins the cubes every
//! frame. Runs on the headless backends, so it needs no display or GPU.
//!
//! ```text
//! engine_app [config.json]
//! ```
//!
//! The config path may also be given in `ENGINE_CONFIG`.

use std::path::PathBuf;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use engine_app::scene::{spawn_camera, spawn_cube, spawn_default_lights};
use engine_app::{Engine, EngineConfig, FlyCamera};
use engine_component::{PointLight, Transform};
use engine_graphics::{HeadlessWindowing, Key, RecordingDevice};
use engine_math::{Quat, Vec3};

/// Frames to run when the config sets no limit.
const DEMO_FRAMES: u64 = 600;
/// Cube spin in degrees per second.
const SPIN_SPEED: f32 = 60.0;

const CUBE_POSITIONS: [Vec3; 10] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(2.0, 5.0, -15.0),
    Vec3::new(-1.5, -2.2, -2.5),
    Vec3::new(-3.8, -2.0, -12.3),
    Vec3::new(2.4, -0.4, -3.5),
    Vec3::new(-1.7, 3.0, -7.5),
    Vec3::new(1.3, -2.0, -2.5),
    Vec3::new(1.5, 2.0, -2.5),
    Vec3::new(1.5, 0.2, -1.5),
    Vec3::new(-1.3, 1.0, -1.5),
];

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("engine_app=info".parse()?))
        .init();

    let mut config = EngineConfig::load(std::env::args_os().nth(1).map(PathBuf::from))?;
    if config.max_frames.is_none() {
        config = config.with_max_frames(DEMO_FRAMES);
    }

    let mut engine = Engine::init(config, HeadlessWindowing::new(), RecordingDevice::new())?;
    let aspect_ratio = engine.aspect_ratio();

    let world = engine.world_mut();
    let camera = spawn_camera(world, aspect_ratio)?;
    spawn_default_lights(world)?;
    let lamp = world.spawn();
    world.add_component(
        lamp,
        PointLight::new(
            Vec3::new(2.0, 2.0, 2.0),
            Vec3::new(1.0, 0.8, 0.7),
            1.0,
            1.0,
            0.09,
            0.032,
        ),
    )?;
    let cubes = CUBE_POSITIONS
        .iter()
        .map(|&position| spawn_cube(world, position))
        .collect::<Result<Vec<_>, _>>()?;
    info!(cubes = cubes.len(), "scene ready");

    let input = engine.input_mut();
    FlyCamera::new(camera).install(input);
    input.register_key_action(Key::Escape, 0, |ctx| ctx.request_shutdown());

    let axis = Vec3::new(1.0, 1.0, 0.0).normalize();
    engine.run(|ctx| {
        let step = Quat::from_axis_angle(axis, (SPIN_SPEED * ctx.delta_time).to_radians());
        for &cube in &cubes {
            if let Some(transform) = ctx.world.get_mut::<Transform>(cube) {
                transform.rotate_local(step);
            }
        }
    })?;

    info!(
        frames = engine.frames(),
        draw_calls = engine.device().draw_calls(),
        "demo finished"
    );
    Ok(())
}
