//! Network events exchanged through bevy_replicon.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::components::{LightId, ObjectId};

/// Client → server: desired world-space movement for this frame.
///
/// Sent with `Channel::Unreliable` since newer inputs supersede older ones.
#[derive(Debug, Clone, Copy, PartialEq, Event, Serialize, Deserialize)]
pub struct PlayerMovement {
    /// Unit-length or zero world-space direction on the XZ plane.
    pub direction: Vec3,
    pub sprinting: bool,
    /// Camera yaw in radians, applied to the avatar's facing.
    pub yaw: f32,
}

/// Client → server: the player pressed E while looking at `target`.
#[derive(Debug, Clone, Copy, PartialEq, Event, Serialize, Deserialize)]
pub struct InteractRequest {
    pub target: ObjectId,
    pub hit_position: Vec3,
}

/// Client → server: flip the light controlled by a switch.
#[derive(Debug, Clone, Copy, PartialEq, Event, Serialize, Deserialize)]
pub struct ToggleLightRequest {
    pub light: LightId,
}

/// Server → clients: remaining grid power in percent of capacity.
#[derive(Debug, Clone, Copy, PartialEq, Event, Serialize, Deserialize)]
pub struct PowerChanged {
    pub percent: f32,
}
