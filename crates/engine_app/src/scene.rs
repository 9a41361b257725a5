//! Helpers for populating a world.

use tracing::debug;

use engine_assets::Model;
use engine_component::{
    AmbientLight, Camera, ComponentError, DirectionalLight, Entity, Mesh, Transform, World,
};
use engine_math::Vec3;

/// A unit cube at `position`.
///
/// # Errors
///
/// Only fails if the world rejects a component.
pub fn spawn_cube(world: &mut World, position: Vec3) -> Result<Entity, ComponentError> {
    let entity = world.spawn();
    world.add_component(entity, Transform::from_position(position))?;
    world.add_component(entity, Mesh::cube())?;
    Ok(entity)
}

/// A `size` x `size` ground plane at `position`, facing +Y.
///
/// # Errors
///
/// Only fails if the world rejects a component.
pub fn spawn_plane(world: &mut World, position: Vec3, size: f32) -> Result<Entity, ComponentError> {
    let entity = world.spawn();
    world.add_component(entity, Transform::from_position(position))?;
    world.add_component(entity, Mesh::plane(size))?;
    Ok(entity)
}

/// One entity per model part, all sharing `transform`.
///
/// The parts keep their uploaded render resources, so nothing is uploaded
/// again on the next frame.
///
/// # Errors
///
/// Only fails if the world rejects a component.
pub fn spawn_model(
    world: &mut World,
    model: Model,
    transform: Transform,
) -> Result<Vec<Entity>, ComponentError> {
    let mut entities = Vec::with_capacity(model.len());
    for part in model.parts {
        let entity = world.spawn();
        world.add_component(entity, transform)?;
        world.add_component(entity, part.mesh)?;
        world.add_component(entity, part.material)?;
        world.add_component(entity, part.resource)?;
        debug!(%entity, part = %part.name, "spawned model part");
        entities.push(entity);
    }
    Ok(entities)
}

/// A camera ten units back on +Z looking down -Z.
///
/// # Errors
///
/// Only fails if the world rejects a component.
pub fn spawn_camera(world: &mut World, aspect_ratio: f32) -> Result<Entity, ComponentError> {
    let entity = world.spawn();
    let camera = Camera::new(
        Vec3::new(0.0, 0.0, 10.0),
        Vec3::Y,
        -90.0,
        0.0,
        45.0,
        aspect_ratio,
        0.1,
        100.0,
    );
    world.add_component(entity, camera)?;
    Ok(entity)
}

/// A dim white ambient light and a white directional light.
///
/// # Errors
///
/// Only fails if the world rejects a component.
pub fn spawn_default_lights(world: &mut World) -> Result<[Entity; 2], ComponentError> {
    let ambient = world.spawn();
    world.add_component(ambient, AmbientLight::new(Vec3::ONE, 0.2))?;
    let directional = world.spawn();
    world.add_component(
        directional,
        DirectionalLight::new(Vec3::new(-0.2, -1.0, -0.3), Vec3::ONE, 1.0),
    )?;
    Ok([ambient, directional])
}
