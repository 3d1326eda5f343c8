use bevy::prelude::*;

use crate::controls::{CameraState, InputState, MovementState};
use crate::sanity::SanityMeter;

/// All per-player gameplay state of this client.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct PlayerSession {
    pub input: InputState,
    pub camera: CameraState,
    pub movement: MovementState,
    pub sanity: SanityMeter,
}

impl PlayerSession {
    /// Back to a fresh session, keeping nothing from the previous game.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
