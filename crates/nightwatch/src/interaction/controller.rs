use bevy::prelude::*;
use bevy_replicon::prelude::*;
use game_server::shared::rules::{INTERACT_COOLDOWN_SECS, INTERACT_RANGE};
use game_server::shared::{InteractRequest, ToggleLightRequest};
use thiserror::Error;

use super::detection::DetectionResult;

/// Why an E press did not turn into a request.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InteractionRefusal {
    #[error("controller is not initialized")]
    NotInitialized,
    #[error("interaction is disabled")]
    Disabled,
    #[error("on cooldown for another {remaining:.2}s")]
    CoolingDown { remaining: f32 },
    #[error("nothing under the crosshair")]
    NoTarget,
    #[error("target is not interactable")]
    NotInteractable,
    #[error("target is {distance:.1} studs away")]
    OutOfRange { distance: f32 },
}

/// Gatekeeper for generic E-key interactions.
#[derive(Resource, Debug, Clone)]
pub struct InteractionController {
    initialized: bool,
    enabled: bool,
    last_success: Option<f64>,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self {
            initialized: false,
            enabled: true,
            last_success: None,
        }
    }
}

impl InteractionController {
    pub fn initialize(&mut self) {
        self.initialized = true;
        self.last_success = None;
    }

    pub fn shutdown(&mut self) {
        self.initialized = false;
        self.last_success = None;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Seconds left until the next interaction is allowed.
    pub fn cooldown_remaining(&self, now: f64) -> f32 {
        self.last_success
            .map(|last| (INTERACT_COOLDOWN_SECS - (now - last) as f32).max(0.0))
            .unwrap_or(0.0)
    }

    /// Checks every precondition in order and, on success, starts the cooldown
    /// and returns the request to send.
    pub fn try_interact(
        &mut self,
        now: f64,
        detection: &DetectionResult,
    ) -> Result<InteractRequest, InteractionRefusal> {
        if !self.initialized {
            return Err(InteractionRefusal::NotInitialized);
        }
        if !self.enabled {
            return Err(InteractionRefusal::Disabled);
        }
        let remaining = self.cooldown_remaining(now);
        if remaining > 0.0 {
            return Err(InteractionRefusal::CoolingDown { remaining });
        }
        let (Some(_), Some(target)) = (detection.target, detection.object_id) else {
            return Err(InteractionRefusal::NoTarget);
        };
        if !detection.interactable {
            return Err(InteractionRefusal::NotInteractable);
        }
        if detection.distance > INTERACT_RANGE {
            return Err(InteractionRefusal::OutOfRange {
                distance: detection.distance,
            });
        }

        self.last_success = Some(now);
        Ok(InteractRequest {
            target,
            hit_position: detection.position,
        })
    }
}

/// Where outbound interaction requests go.
pub trait InteractionLink: Send + Sync + 'static {
    fn send_interact(&self, commands: &mut Commands, request: InteractRequest);
    fn send_toggle(&self, commands: &mut Commands, request: ToggleLightRequest);
}

/// Sends requests to the server as replicon client events.
pub struct ReplicatedLink;

impl InteractionLink for ReplicatedLink {
    fn send_interact(&self, commands: &mut Commands, request: InteractRequest) {
        commands.client_trigger(request);
    }

    fn send_toggle(&self, commands: &mut Commands, request: ToggleLightRequest) {
        commands.client_trigger(request);
    }
}

/// Drops every request.
pub struct NullLink;

impl InteractionLink for NullLink {
    fn send_interact(&self, _commands: &mut Commands, _request: InteractRequest) {}

    fn send_toggle(&self, _commands: &mut Commands, _request: ToggleLightRequest) {}
}

#[derive(Resource)]
pub struct LinkHandle(pub Box<dyn InteractionLink>);

#[cfg(test)]
mod tests {
    use super::*;
    use game_server::shared::ObjectId;

    fn looking_at_door(distance: f32) -> DetectionResult {
        DetectionResult {
            target: Some(Entity::PLACEHOLDER),
            object_id: Some(ObjectId(4)),
            position: Vec3::new(0.0, 1.6, -distance),
            distance,
            interactable: true,
        }
    }

    fn ready() -> InteractionController {
        let mut controller = InteractionController::default();
        controller.initialize();
        controller
    }

    #[test]
    fn successful_interaction_builds_the_request() {
        let mut controller = ready();
        let request = controller.try_interact(1.0, &looking_at_door(2.0)).unwrap();
        assert_eq!(request.target, ObjectId(4));
        assert_eq!(request.hit_position, Vec3::new(0.0, 1.6, -2.0));
    }

    #[test]
    fn uninitialized_controller_refuses() {
        let mut controller = InteractionController::default();
        assert_eq!(
            controller.try_interact(1.0, &looking_at_door(2.0)),
            Err(InteractionRefusal::NotInitialized)
        );
    }

    #[test]
    fn disabled_controller_refuses() {
        let mut controller = ready();
        controller.set_enabled(false);
        assert_eq!(
            controller.try_interact(1.0, &looking_at_door(2.0)),
            Err(InteractionRefusal::Disabled)
        );
    }

    #[test]
    fn cooldown_blocks_until_it_has_elapsed() {
        let mut controller = ready();
        assert!(controller.try_interact(10.0, &looking_at_door(2.0)).is_ok());
        assert!(matches!(
            controller.try_interact(10.29, &looking_at_door(2.0)),
            Err(InteractionRefusal::CoolingDown { .. })
        ));
        assert!(controller.try_interact(10.3, &looking_at_door(2.0)).is_ok());
    }

    #[test]
    fn refused_attempts_do_not_start_the_cooldown() {
        let mut controller = ready();
        let mut far = looking_at_door(6.0);
        assert!(matches!(
            controller.try_interact(1.0, &far),
            Err(InteractionRefusal::OutOfRange { .. })
        ));
        far.distance = 5.0;
        assert!(controller.try_interact(1.05, &far).is_ok());
    }

    #[test]
    fn missing_or_plain_targets_are_refused() {
        let mut controller = ready();
        assert_eq!(
            controller.try_interact(1.0, &DetectionResult::miss(INTERACT_RANGE)),
            Err(InteractionRefusal::NoTarget)
        );

        let mut wall = looking_at_door(1.0);
        wall.interactable = false;
        assert_eq!(
            controller.try_interact(1.0, &wall),
            Err(InteractionRefusal::NotInteractable)
        );
    }

    #[test]
    fn shutdown_requires_a_new_initialize() {
        let mut controller = ready();
        controller.shutdown();
        assert_eq!(
            controller.try_interact(1.0, &looking_at_door(2.0)),
            Err(InteractionRefusal::NotInitialized)
        );
    }
}
