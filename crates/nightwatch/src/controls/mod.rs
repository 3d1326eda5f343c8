//! First-person player controller.
//!
//! Input capture, camera orientation and movement all read and write the
//! [`PlayerSession`] resource. The controller only runs between
//! [`ControllerLifecycle::start`] and [`ControllerLifecycle::stop`], which
//! follow the `InGame` state.

mod camera;
mod input;
mod movement;

pub use camera::{CameraState, PlayerCamera, PITCH_LIMIT};
pub use input::InputState;
pub use movement::{movement_direction, MovementState};

use app::LOG_CLIENT;
use bevy::prelude::*;
use bevy_replicon::prelude::ClientState;
use tracing::info;

use crate::interaction::InteractionController;
use crate::session::PlayerSession;
use crate::utils::cleanup;
use crate::GameState;

/// Per-frame order of the gameplay systems.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum ControlSystems {
    Input,
    Movement,
    /// Sanity and footsteps, which react to this frame's movement.
    Meters,
    Interaction,
    Camera,
}

/// Idempotent start/stop guard for the controller's listeners.
#[derive(Resource, Debug, Default)]
pub struct ControllerLifecycle {
    running: bool,
}

impl ControllerLifecycle {
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Starts a fresh session. Returns `false` if already running.
    pub fn start(
        &mut self,
        session: &mut PlayerSession,
        controller: &mut InteractionController,
    ) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        session.reset();
        controller.initialize();
        true
    }

    /// Releases all keys and disables interaction. Returns `false` if not
    /// running.
    pub fn stop(
        &mut self,
        session: &mut PlayerSession,
        controller: &mut InteractionController,
    ) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        session.input.reset();
        session.movement = MovementState::default();
        controller.shutdown();
        true
    }
}

fn controller_running(lifecycle: Res<ControllerLifecycle>) -> bool {
    lifecycle.is_running()
}

fn start_controller(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut lifecycle: ResMut<ControllerLifecycle>,
    mut session: ResMut<PlayerSession>,
    mut controller: ResMut<InteractionController>,
) {
    if lifecycle.start(&mut session, &mut controller) {
        // Keys held while loading count as pressed.
        session.input = InputState::from_held(&keyboard);
        info!(target: LOG_CLIENT, "Player controller started");
    }
}

fn stop_controller(
    mut lifecycle: ResMut<ControllerLifecycle>,
    mut session: ResMut<PlayerSession>,
    mut controller: ResMut<InteractionController>,
) {
    if lifecycle.stop(&mut session, &mut controller) {
        info!(target: LOG_CLIENT, "Player controller stopped");
    }
}

pub struct ControlsPlugin;

impl Plugin for ControlsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerSession>()
            .init_resource::<ControllerLifecycle>()
            .configure_sets(
                Update,
                (
                    ControlSystems::Input,
                    ControlSystems::Movement,
                    ControlSystems::Meters,
                    ControlSystems::Interaction,
                    ControlSystems::Camera,
                )
                    .chain()
                    .run_if(in_state(GameState::InGame))
                    .run_if(controller_running),
            )
            .add_systems(
                OnEnter(GameState::InGame),
                (start_controller, camera::spawn_camera, camera::grab_cursor),
            )
            .add_systems(
                OnExit(GameState::InGame),
                (stop_controller, camera::release_cursor, cleanup::<PlayerCamera>),
            )
            .add_systems(
                Update,
                (input::capture_input, camera::mouse_look)
                    .chain()
                    .in_set(ControlSystems::Input),
            )
            .add_systems(
                Update,
                (
                    movement::update_movement,
                    movement::send_movement.run_if(in_state(ClientState::Connected)),
                )
                    .chain()
                    .in_set(ControlSystems::Movement),
            )
            .add_systems(
                Update,
                camera::follow_local_player.in_set(ControlSystems::Camera),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_and_stop_are_idempotent() {
        let mut lifecycle = ControllerLifecycle::default();
        let mut session = PlayerSession::default();
        let mut controller = InteractionController::default();

        assert!(lifecycle.start(&mut session, &mut controller));
        assert!(!lifecycle.start(&mut session, &mut controller));
        assert!(controller.is_initialized());

        session.input.forward = true;
        assert!(lifecycle.stop(&mut session, &mut controller));
        assert!(!lifecycle.stop(&mut session, &mut controller));
        assert_eq!(session.input, InputState::default());
        assert!(!controller.is_initialized());
    }

    #[test]
    fn keys_held_on_start_are_applied() {
        let mut keyboard = ButtonInput::<KeyCode>::default();
        keyboard.press(KeyCode::KeyD);
        let mut app = App::new();
        app.insert_resource(keyboard)
            .init_resource::<ControllerLifecycle>()
            .init_resource::<PlayerSession>()
            .init_resource::<InteractionController>()
            .add_systems(Update, start_controller);
        app.update();

        let session = app.world().resource::<PlayerSession>();
        assert!(session.input.right);
        assert!(app.world().resource::<ControllerLifecycle>().is_running());
    }

    #[test]
    fn restart_begins_a_fresh_session() {
        let mut lifecycle = ControllerLifecycle::default();
        let mut session = PlayerSession::default();
        let mut controller = InteractionController::default();

        lifecycle.start(&mut session, &mut controller);
        session.sanity.set(20.0);
        lifecycle.stop(&mut session, &mut controller);
        lifecycle.start(&mut session, &mut controller);
        assert_eq!(session.sanity.value(), 100.0);
    }
}
