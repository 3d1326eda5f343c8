//! Server-side player movement.

use app::LOG_SERVER;
use bevy::prelude::*;
use bevy_replicon::prelude::*;
use tracing::warn;

use crate::shared::rules::{SPRINT_SPEED, WALK_SPEED};
use crate::shared::{Player, PlayerMovement, PlayerOwner, Velocity};

/// Planar velocity for a movement request.
///
/// The vertical component of the requested direction is discarded, and a
/// sprint flag without any direction yields no motion.
pub fn movement_velocity(movement: &PlayerMovement) -> Vec3 {
    let direction = Vec3::new(movement.direction.x, 0.0, movement.direction.z);
    if direction.length_squared() < 1e-4 {
        return Vec3::ZERO;
    }
    let speed = if movement.sprinting {
        SPRINT_SPEED
    } else {
        WALK_SPEED
    };
    direction.normalize() * speed
}

/// Avatar facing for a camera yaw. Yaw 0 looks down -Z.
pub fn facing(yaw: f32) -> Quat {
    Quat::from_rotation_y(-yaw)
}

/// Observer that turns a client's movement request into velocity.
///
/// Position itself is integrated by [`apply_velocity`] on the fixed tick.
pub fn process_player_movement(
    trigger: On<FromClient<PlayerMovement>>,
    mut players: Query<(&PlayerOwner, &mut Velocity, &mut Transform), With<Player>>,
) {
    let FromClient { client_id, message } = trigger.event();
    let Some(client_entity) = client_id.entity() else {
        warn!(target: LOG_SERVER, "Received movement from invalid client: {:?}", client_id);
        return;
    };

    for (owner, mut velocity, mut transform) in &mut players {
        if owner.client_entity == client_entity {
            velocity.linear = movement_velocity(message);
            transform.rotation = facing(message.yaw);
            return;
        }
    }

    warn!(target: LOG_SERVER, "No player found for client {:?}", client_id);
}

pub fn apply_velocity(mut query: Query<(&mut Transform, &Velocity)>, time: Res<Time>) {
    for (mut transform, velocity) in &mut query {
        transform.translation += velocity.linear * time.delta_secs();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::time::TimeUpdateStrategy;
    use std::time::Duration;

    fn request(direction: Vec3, sprinting: bool) -> PlayerMovement {
        PlayerMovement {
            direction,
            sprinting,
            yaw: 0.0,
        }
    }

    #[test]
    fn walking_and_sprinting_use_their_speeds() {
        let walk = movement_velocity(&request(Vec3::NEG_Z, false));
        let sprint = movement_velocity(&request(Vec3::NEG_Z, true));
        assert!((walk.length() - WALK_SPEED).abs() < 1e-4);
        assert!((sprint.length() - SPRINT_SPEED).abs() < 1e-4);
    }

    #[test]
    fn sprinting_in_place_does_not_move() {
        assert_eq!(movement_velocity(&request(Vec3::ZERO, true)), Vec3::ZERO);
    }

    #[test]
    fn vertical_input_is_ignored() {
        let velocity = movement_velocity(&request(Vec3::new(1.0, 5.0, 0.0), false));
        assert_eq!(velocity.y, 0.0);
        assert!((velocity.x - WALK_SPEED).abs() < 1e-4);
    }

    #[test]
    fn facing_matches_camera_yaw() {
        let yaw = std::f32::consts::FRAC_PI_2;
        let forward = facing(yaw) * Vec3::NEG_Z;
        assert!((forward - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn velocity_is_integrated_over_time() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)))
            .add_systems(Update, apply_velocity);
        let entity = app
            .world_mut()
            .spawn((
                Transform::default(),
                Velocity {
                    linear: Vec3::new(16.0, 0.0, 0.0),
                },
            ))
            .id();

        for _ in 0..3 {
            app.update();
        }

        // At most 0.3 s have elapsed at 16 studs/s.
        let transform = app.world().get::<Transform>(entity).unwrap();
        assert!(transform.translation.x > 0.0);
        assert!(transform.translation.x <= 16.0 * 0.3 + 1e-3);
        assert_eq!(transform.translation.y, 0.0);
    }
}
