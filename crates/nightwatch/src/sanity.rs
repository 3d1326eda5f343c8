//! Sanity meter drained by moving around.

use app::LOG_GAMEPLAY;
use bevy::prelude::*;
use tracing::{debug, info};

use crate::controls::{ControlSystems, MovementState};
use crate::session::PlayerSession;

pub const MAX_SANITY: f32 = 100.0;

/// Drain per second for each activity.
pub const IDLE_DRAIN: f32 = 0.0;
pub const WALK_DRAIN: f32 = 0.01;
pub const SPRINT_DRAIN: f32 = 0.05;

/// Sanity in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SanityMeter {
    value: f32,
}

impl Default for SanityMeter {
    fn default() -> Self {
        Self { value: MAX_SANITY }
    }
}

impl SanityMeter {
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn drain_rate(movement: &MovementState) -> f32 {
        match (movement.is_moving, movement.is_sprinting) {
            (false, _) => IDLE_DRAIN,
            (true, false) => WALK_DRAIN,
            (true, true) => SPRINT_DRAIN,
        }
    }

    /// Drains the meter for `dt` seconds of the given movement.
    pub fn tick(&mut self, dt: f32, movement: &MovementState) {
        self.set(self.value - Self::drain_rate(movement) * dt.max(0.0));
    }

    pub fn set(&mut self, value: f32) {
        self.value = value.clamp(0.0, MAX_SANITY);
    }

    pub fn reset(&mut self) {
        self.value = MAX_SANITY;
    }
}

pub fn drain_sanity(time: Res<Time>, mut session: ResMut<PlayerSession>) {
    let before = session.sanity.value();
    let movement = session.movement;
    session.sanity.tick(time.delta_secs(), &movement);
    let after = session.sanity.value();

    // Log whenever a multiple of 10 is crossed.
    if (before / 10.0).ceil() != (after / 10.0).ceil() {
        debug!(target: LOG_GAMEPLAY, "Sanity down to {:.1}", after);
    }
    if before > 0.0 && after == 0.0 {
        info!(target: LOG_GAMEPLAY, "Sanity depleted");
    }
}

pub struct SanityPlugin;

impl Plugin for SanityPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, drain_sanity.in_set(ControlSystems::Meters));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moving(sprinting: bool) -> MovementState {
        MovementState {
            is_moving: true,
            is_sprinting: sprinting,
            direction: Vec3::NEG_Z,
        }
    }

    #[test]
    fn sprinting_drains_linearly() {
        let mut meter = SanityMeter::default();
        for _ in 0..100 {
            meter.tick(1.0, &moving(true));
        }
        assert!((meter.value() - (100.0 - 0.05 * 100.0)).abs() < 1e-3);
    }

    #[test]
    fn walking_drains_linearly() {
        let mut meter = SanityMeter::default();
        meter.tick(250.0, &moving(false));
        assert!((meter.value() - 97.5).abs() < 1e-4);
    }

    #[test]
    fn standing_still_keeps_sanity() {
        let mut meter = SanityMeter::default();
        meter.tick(1000.0, &MovementState::default());
        assert_eq!(meter.value(), MAX_SANITY);
    }

    #[test]
    fn sanity_never_drops_below_zero() {
        let mut meter = SanityMeter::default();
        meter.tick(10_000.0, &moving(true));
        assert_eq!(meter.value(), 0.0);
        meter.reset();
        assert_eq!(meter.value(), MAX_SANITY);
    }

    #[test]
    fn set_clamps() {
        let mut meter = SanityMeter::default();
        meter.set(150.0);
        assert_eq!(meter.value(), MAX_SANITY);
        meter.set(-1.0);
        assert_eq!(meter.value(), 0.0);
    }
}
