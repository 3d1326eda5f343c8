//! Light switches: a second E-key path with its own, longer reach.

use bevy::prelude::*;
use game_server::shared::rules::LIGHT_SWITCH_RANGE;
use game_server::shared::LightId;

use super::detection::Raycaster;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchTarget {
    pub entity: Entity,
    pub light: LightId,
    pub distance: f32,
}

/// The switch under the crosshair, if the nearest hit within switch range
/// is one.
pub fn switch_target(raycaster: &dyn Raycaster, origin: Vec3, look: Vec3) -> Option<SwitchTarget> {
    let direction = Dir3::new(look).ok()?;
    let hit = raycaster.cast(origin, direction, LIGHT_SWITCH_RANGE)?;
    Some(SwitchTarget {
        entity: hit.entity,
        light: hit.switch?,
        distance: hit.distance,
    })
}
