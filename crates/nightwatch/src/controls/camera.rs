//! First-person camera: yaw/pitch state, mouse look and following the avatar.

use bevy::input::mouse::AccumulatedMouseMotion;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, CursorOptions, PrimaryWindow};
use game_server::eye_position;
use std::f32::consts::TAU;

use crate::networking::LocalPlayer;
use crate::session::PlayerSession;
use crate::settings::ClientSettings;
use settings::SettingsArc;

pub const PITCH_LIMIT: f32 = 80.0 * std::f32::consts::PI / 180.0;

/// Orientation of the player's view in radians.
///
/// Yaw 0 looks down -Z and grows clockwise seen from above.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub yaw: f32,
    pub pitch: f32,
    pub first_person: bool,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            first_person: true,
        }
    }
}

impl CameraState {
    /// Integrates one mouse delta. Pitch is clamped to ±80° and yaw wrapped
    /// into `[0, 2π)`.
    pub fn apply_mouse_delta(&mut self, delta: Vec2, sensitivity: f32) {
        self.yaw = (self.yaw + delta.x * sensitivity).rem_euclid(TAU);
        self.pitch = (self.pitch - delta.y * sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Unit vector the camera looks along.
    pub fn look_direction(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(sin_yaw * cos_pitch, sin_pitch, -cos_yaw * cos_pitch)
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(-self.yaw) * Quat::from_rotation_x(self.pitch)
    }
}

/// Marker for the in-game camera.
#[derive(Component)]
pub struct PlayerCamera;

pub fn spawn_camera(mut commands: Commands, settings: Res<SettingsArc<ClientSettings>>) {
    commands.spawn((
        Camera3d::default(),
        Projection::from(PerspectiveProjection {
            fov: settings.field_of_view_degrees.to_radians(),
            ..default()
        }),
        Transform::from_xyz(0.0, 1.6, 0.0),
        PlayerCamera,
        Name::new("Player Camera"),
    ));
}

pub fn mouse_look(
    motion: Res<AccumulatedMouseMotion>,
    settings: Res<SettingsArc<ClientSettings>>,
    mut session: ResMut<PlayerSession>,
) {
    if motion.delta == Vec2::ZERO {
        return;
    }
    session
        .camera
        .apply_mouse_delta(motion.delta, settings.mouse_sensitivity);
}

/// Places the camera at the local avatar's eyes, facing the session's view.
pub fn follow_local_player(
    session: Res<PlayerSession>,
    local_player: Query<&Transform, (With<LocalPlayer>, Without<PlayerCamera>)>,
    mut camera: Query<&mut Transform, With<PlayerCamera>>,
) {
    let Ok(mut camera_transform) = camera.single_mut() else {
        return;
    };
    if let Ok(player_transform) = local_player.single() {
        camera_transform.translation = eye_position(player_transform.translation);
    }
    camera_transform.rotation = session.camera.rotation();
}

pub fn set_cursor_grab(window: &mut CursorOptions, grabbed: bool) {
    window.grab_mode = if grabbed {
        CursorGrabMode::Locked
    } else {
        CursorGrabMode::None
    };
    window.visible = !grabbed;
}

pub fn grab_cursor(mut cursor: Query<&mut CursorOptions, With<PrimaryWindow>>) {
    if let Ok(mut cursor) = cursor.single_mut() {
        set_cursor_grab(&mut cursor, true);
    }
}

pub fn release_cursor(mut cursor: Query<&mut CursorOptions, With<PrimaryWindow>>) {
    if let Ok(mut cursor) = cursor.single_mut() {
        set_cursor_grab(&mut cursor, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn pitch_is_clamped_for_huge_deltas() {
        let mut camera = CameraState::default();
        camera.apply_mouse_delta(Vec2::new(0.0, -1.0e6), 0.002);
        assert_eq!(camera.pitch, PITCH_LIMIT);
        camera.apply_mouse_delta(Vec2::new(0.0, 1.0e9), 0.002);
        assert_eq!(camera.pitch, -PITCH_LIMIT);
        assert!((PITCH_LIMIT.to_degrees() - 80.0).abs() < 1e-4);
    }

    #[test]
    fn mouse_up_raises_pitch() {
        let mut camera = CameraState::default();
        camera.apply_mouse_delta(Vec2::new(0.0, -100.0), 0.002);
        assert!((camera.pitch - 0.2).abs() < EPS);
    }

    #[test]
    fn yaw_wraps_into_one_turn() {
        let mut camera = CameraState::default();
        camera.apply_mouse_delta(Vec2::new(-10.0, 0.0), 0.01);
        assert!(camera.yaw >= 0.0 && camera.yaw < TAU);
        assert!((camera.yaw - (TAU - 0.1)).abs() < 1e-4);
    }

    #[test]
    fn look_direction_at_rest_is_forward() {
        let look = CameraState::default().look_direction();
        assert!((look - Vec3::NEG_Z).length() < EPS);
    }

    #[test]
    fn look_direction_is_unit_length_and_matches_rotation() {
        for (yaw, pitch) in [(0.3, 0.2), (2.0, -1.0), (5.5, 1.2)] {
            let camera = CameraState {
                yaw,
                pitch,
                first_person: true,
            };
            let look = camera.look_direction();
            assert!((look.length() - 1.0).abs() < EPS);
            assert!((camera.rotation() * Vec3::NEG_Z - look).length() < 1e-4);
        }
    }
}
