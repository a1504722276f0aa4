// src/session/tray.rs
use log::debug;

use crate::models::{BodyHandle, CollisionShape, RigidBody};
use crate::utils::{DiceError, TrayDimensions};
use crate::world::World;

/// Registers the floor (`y = 0`) and the four walls of the tray as static half-spaces.
///
/// # Returns
/// Handles of the floor followed by the `+x`, `-x`, `+z` and `-z` walls.
pub fn build_tray(world: &mut World, tray: TrayDimensions) -> Result<Vec<BodyHandle>, DiceError> {
    let (half_width, half_depth) = tray.half_extents();
    let planes = [
        ((0.0, 0.0, 0.0), (0.0, 1.0, 0.0)),
        ((half_width, 0.0, 0.0), (-1.0, 0.0, 0.0)),
        ((-half_width, 0.0, 0.0), (1.0, 0.0, 0.0)),
        ((0.0, 0.0, half_depth), (0.0, 0.0, -1.0)),
        ((0.0, 0.0, -half_depth), (0.0, 0.0, 1.0)),
    ];

    let mut handles = Vec::with_capacity(planes.len());
    for (position, normal) in planes {
        let body = RigidBody::new(
            world.allocate_handle(),
            CollisionShape::HalfSpace { normal },
            0.0,
            world.material(),
        )?
        .with_position(position);
        handles.push(world.register_boundary(body)?);
    }

    debug!("Tray of {} x {} built from {} boundary bodies", tray.width, tray.depth, handles.len());
    Ok(handles)
}
