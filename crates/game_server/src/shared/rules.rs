//! Gameplay constants both sides must agree on.

/// Max distance (studs) for generic E-key interactions.
pub const INTERACT_RANGE: f32 = 5.0;

/// Max distance (studs) for flipping a light switch, twice
/// [`INTERACT_RANGE`].
pub const LIGHT_SWITCH_RANGE: f32 = 10.0;

/// Minimum time between two accepted interactions of one player.
pub const INTERACT_COOLDOWN_SECS: f32 = 0.3;

/// Extra reach the server grants for latency between client and server poses.
pub const SERVER_RANGE_TOLERANCE: f32 = 1.5;

pub const WALK_SPEED: f32 = 16.0;
pub const SPRINT_SPEED: f32 = 24.0;

/// Camera height above the player's origin.
pub const EYE_HEIGHT: f32 = 1.6;

pub const POWER_CAPACITY: f32 = 100.0;
pub const LIGHT_TOGGLE_COST: f32 = 10.0;

pub const INTERACTABLE_TAG: &str = "Interactable";
pub const INTERACTABLE_ATTRIBUTE: &str = "Interactable";
/// Boolean attribute flipped by every accepted interaction.
pub const ACTIVATED_ATTRIBUTE: &str = "Activated";
/// Objects with this boolean attribute refill the power grid when used.
pub const RESTORES_POWER_ATTRIBUTE: &str = "RestoresPower";
