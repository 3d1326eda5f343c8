//! Raw key state for the six gameplay keys.

use bevy::prelude::*;

use crate::session::PlayerSession;

/// Held state of W/A/S/D, Shift and E.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub sprint: bool,
    pub interact: bool,
}

impl InputState {
    /// Applies a key down (`pressed = true`) or key up event.
    ///
    /// Returns `false` for keys that are not bound to anything.
    pub fn apply_key(&mut self, key: KeyCode, pressed: bool) -> bool {
        let flag = match key {
            KeyCode::KeyW => &mut self.forward,
            KeyCode::KeyS => &mut self.back,
            KeyCode::KeyA => &mut self.left,
            KeyCode::KeyD => &mut self.right,
            KeyCode::ShiftLeft | KeyCode::ShiftRight => &mut self.sprint,
            KeyCode::KeyE => &mut self.interact,
            _ => return false,
        };
        *flag = pressed;
        true
    }

    /// State matching the keys held right now.
    pub fn from_held(keyboard: &ButtonInput<KeyCode>) -> Self {
        let mut input = Self::default();
        for key in keyboard.get_pressed() {
            input.apply_key(*key, true);
        }
        input
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn any_movement(&self) -> bool {
        self.forward || self.back || self.left || self.right
    }
}

/// Copies this frame's key transitions into the session.
pub fn capture_input(keyboard: Res<ButtonInput<KeyCode>>, mut session: ResMut<PlayerSession>) {
    for key in keyboard.get_just_pressed() {
        session.input.apply_key(*key, true);
    }
    for key in keyboard.get_just_released() {
        session.input.apply_key(*key, false);
    }
    // Both shift keys share one flag; releasing one must not clear the other.
    if session.input.sprint
        && !keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight])
    {
        session.input.sprint = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_down_and_up_toggle_flags() {
        let mut input = InputState::default();
        assert!(input.apply_key(KeyCode::KeyW, true));
        assert!(input.apply_key(KeyCode::ShiftRight, true));
        assert!(input.forward && input.sprint);

        input.apply_key(KeyCode::KeyW, false);
        assert!(!input.forward);
        assert!(!input.any_movement());
    }

    #[test]
    fn held_keys_are_picked_up() {
        let mut keyboard = ButtonInput::<KeyCode>::default();
        keyboard.press(KeyCode::KeyW);
        keyboard.press(KeyCode::ShiftLeft);
        keyboard.press(KeyCode::KeyQ);

        let input = InputState::from_held(&keyboard);
        assert!(input.forward && input.sprint);
        assert!(!input.back && !input.interact);
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let mut input = InputState::default();
        assert!(!input.apply_key(KeyCode::KeyQ, true));
        assert_eq!(input, InputState::default());
    }

    #[test]
    fn reset_clears_everything() {
        let mut input = InputState {
            forward: true,
            interact: true,
            ..Default::default()
        };
        input.reset();
        assert_eq!(input, InputState::default());
    }

    #[test]
    fn capture_reads_keyboard_transitions() {
        let mut app = App::new();
        app.init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<PlayerSession>()
            .add_systems(Update, capture_input);

        let mut keyboard = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        keyboard.press(KeyCode::KeyA);
        keyboard.press(KeyCode::ShiftLeft);
        app.update();

        let input = app.world().resource::<PlayerSession>().input;
        assert!(input.left && input.sprint);

        let mut keyboard = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        keyboard.clear();
        keyboard.release(KeyCode::KeyA);
        app.update();

        let input = app.world().resource::<PlayerSession>().input;
        assert!(!input.left && input.sprint);
    }
}
