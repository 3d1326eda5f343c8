//! WASD to world-space movement.

use bevy::prelude::*;
use bevy_replicon::prelude::*;
use game_server::shared::PlayerMovement;

use super::input::InputState;
use crate::session::PlayerSession;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MovementState {
    pub is_moving: bool,
    pub is_sprinting: bool,
    /// Unit-length world direction, zero while standing still.
    pub direction: Vec3,
}

/// Turns held keys into a world-space direction for the given camera yaw.
///
/// The local direction `(D - A, 0, S - W)` is normalised and rotated by yaw,
/// so W always moves where the camera looks. Sprinting needs Shift and a
/// non-zero direction.
pub fn movement_direction(yaw: f32, input: &InputState) -> MovementState {
    let axis = |positive: bool, negative: bool| positive as i8 as f32 - negative as i8 as f32;
    let local = Vec3::new(
        axis(input.right, input.left),
        0.0,
        axis(input.back, input.forward),
    );
    if local == Vec3::ZERO {
        return MovementState::default();
    }

    let local = local.normalize();
    let (sin, cos) = yaw.sin_cos();
    MovementState {
        is_moving: true,
        is_sprinting: input.sprint,
        direction: Vec3::new(
            local.x * cos - local.z * sin,
            0.0,
            local.x * sin + local.z * cos,
        ),
    }
}

pub fn update_movement(mut session: ResMut<PlayerSession>) {
    let movement = movement_direction(session.camera.yaw, &session.input);
    session.movement = movement;
}

/// Forwards movement to the server while moving, plus once when stopping.
pub fn send_movement(
    mut commands: Commands,
    session: Res<PlayerSession>,
    mut was_moving: Local<bool>,
) {
    let movement = session.movement;
    if !movement.is_moving && !*was_moving {
        return;
    }
    *was_moving = movement.is_moving;

    commands.client_trigger(PlayerMovement {
        direction: movement.direction,
        sprinting: movement.is_sprinting,
        yaw: session.camera.yaw,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    const EPS: f32 = 1e-5;

    fn keys(forward: bool, back: bool, left: bool, right: bool) -> InputState {
        InputState {
            forward,
            back,
            left,
            right,
            ..Default::default()
        }
    }

    #[test]
    fn every_key_combination_gives_unit_or_zero_direction() {
        for mask in 0u8..16 {
            let input = keys(mask & 1 != 0, mask & 2 != 0, mask & 4 != 0, mask & 8 != 0);
            for step in 0..16 {
                let yaw = step as f32 * PI / 8.0;
                let movement = movement_direction(yaw, &input);
                if movement.is_moving {
                    assert!((movement.direction.length() - 1.0).abs() < EPS);
                } else {
                    assert_eq!(movement.direction, Vec3::ZERO);
                }
            }
        }
    }

    #[test]
    fn opposite_keys_cancel() {
        let movement = movement_direction(1.0, &keys(true, true, true, true));
        assert!(!movement.is_moving);
    }

    #[test]
    fn forward_follows_yaw() {
        let forward = movement_direction(0.0, &keys(true, false, false, false));
        assert!((forward.direction - Vec3::NEG_Z).length() < EPS);

        let turned = movement_direction(FRAC_PI_2, &keys(true, false, false, false));
        assert!((turned.direction - Vec3::X).length() < EPS);
    }

    #[test]
    fn strafing_right_at_rest_moves_along_x() {
        let movement = movement_direction(0.0, &keys(false, false, false, true));
        assert!((movement.direction - Vec3::X).length() < EPS);
    }

    #[test]
    fn sprint_requires_shift_and_movement() {
        let mut input = keys(false, false, false, false);
        input.sprint = true;
        assert!(!movement_direction(0.0, &input).is_sprinting);

        input.left = true;
        assert!(movement_direction(0.0, &input).is_sprinting);

        input.sprint = false;
        assert!(!movement_direction(0.0, &input).is_sprinting);
    }
}
