//! Smooths replicated player motion between 20 Hz server updates.
//!
//! Positions are predicted from the replicated velocity every frame and
//! pulled towards the last server position with exponential smoothing.

use app::LOG_CLIENT;
use bevy::prelude::*;
use bevy_replicon::prelude::ClientSystems;
use game_server::shared::{Player, Velocity};
use tracing::debug;

pub struct InterpolationPlugin;

impl Plugin for InterpolationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (capture_server_updates, interpolate_to_server_position)
                .chain()
                .after(ClientSystems::Receive),
        );
    }
}

#[derive(Component, Debug)]
pub struct InterpolationState {
    /// Last position received from the server.
    pub server_position: Vec3,
    /// Fraction of the remaining error removed per frame.
    pub correction_speed: f32,
}

impl InterpolationState {
    pub fn new(server_position: Vec3) -> Self {
        Self {
            server_position,
            correction_speed: 0.15,
        }
    }

    /// Next rendered position from the current one.
    pub fn step(&self, current: Vec3, velocity: Vec3, delta: f32) -> Vec3 {
        let mut next = current;
        if velocity.length_squared() > 0.001 {
            next += velocity * delta;
        }
        let error = self.server_position - next;
        if error.length() > 0.001 {
            next += error * self.correction_speed;
        }
        next
    }
}

/// Runs right after replication, so `Changed<Transform>` only sees server
/// writes. Interpolation below bypasses change detection.
fn capture_server_updates(
    mut commands: Commands,
    mut updated: Query<
        (Entity, &Transform, Option<&mut InterpolationState>),
        (With<Player>, Changed<Transform>),
    >,
) {
    for (entity, transform, state) in &mut updated {
        match state {
            Some(mut state) => state.server_position = transform.translation,
            None => {
                commands
                    .entity(entity)
                    .insert(InterpolationState::new(transform.translation));
                debug!(
                    target: LOG_CLIENT,
                    "Interpolating player {:?} from {:?}", entity, transform.translation
                );
            }
        }
    }
}

fn interpolate_to_server_position(
    mut players: Query<(&mut Transform, &Velocity, &InterpolationState), With<Player>>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();
    for (mut transform, velocity, state) in &mut players {
        let next = state.step(transform.translation, velocity.linear, delta);
        transform.bypass_change_detection().translation = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resting_player_converges_on_server_position() {
        let state = InterpolationState::new(Vec3::new(10.0, 0.0, 0.0));
        let mut position = Vec3::ZERO;
        for _ in 0..100 {
            position = state.step(position, Vec3::ZERO, 1.0 / 60.0);
        }
        assert!(position.distance(state.server_position) < 0.01);
    }

    #[test]
    fn correction_never_overshoots() {
        let state = InterpolationState::new(Vec3::new(1.0, 0.0, 0.0));
        let next = state.step(Vec3::ZERO, Vec3::ZERO, 1.0 / 60.0);
        assert!(next.x > 0.0 && next.x < 1.0);
    }

    #[test]
    fn velocity_predicts_between_updates() {
        let state = InterpolationState::new(Vec3::ZERO);
        let next = state.step(Vec3::ZERO, Vec3::new(16.0, 0.0, 0.0), 0.5);
        assert!(next.x > 0.0);
    }
}
