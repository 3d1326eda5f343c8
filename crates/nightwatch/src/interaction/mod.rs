//! E-key interaction.
//!
//! Every frame one ray is cast from the camera. Its nearest hit within
//! [`INTERACT_RANGE`] feeds the generic [`InteractionController`]; a light
//! switch within [`LIGHT_SWITCH_RANGE`](game_server::shared::rules::LIGHT_SWITCH_RANGE)
//! is tracked separately. Pressing E sends the resulting request through the
//! [`InteractionLink`].

mod controller;
mod detection;
mod highlight;
mod switches;

pub use controller::{
    InteractionController, InteractionLink, InteractionRefusal, LinkHandle, NullLink,
    ReplicatedLink,
};
pub use detection::{
    detect, ColliderRaycaster, DetectionResult, NullRaycaster, RayHit, RaycastTarget, Raycaster,
};
pub use highlight::{highlight_target, Highlighted};
pub use switches::{switch_target, SwitchTarget};

use app::LOG_GAMEPLAY;
use bevy::prelude::*;
use game_server::shared::rules::INTERACT_RANGE;
use game_server::shared::{
    Attributes, BoxCollider, LightSwitch, ObjectId, Tags, ToggleLightRequest,
};
use tracing::debug;

use crate::controls::{ControlSystems, PlayerCamera};
use crate::session::PlayerSession;
use crate::GameState;

/// What the crosshair points at this frame.
#[derive(Resource, Debug, Clone, Copy)]
pub struct Crosshair {
    pub detection: DetectionResult,
    pub switch: Option<SwitchTarget>,
}

impl Default for Crosshair {
    fn default() -> Self {
        Self {
            detection: DetectionResult::miss(INTERACT_RANGE),
            switch: None,
        }
    }
}

fn update_crosshair(
    session: Res<PlayerSession>,
    camera: Query<&Transform, With<PlayerCamera>>,
    targets: Query<
        (
            Entity,
            Option<&ObjectId>,
            &Transform,
            &BoxCollider,
            Option<&Tags>,
            Option<&Attributes>,
            Option<&LightSwitch>,
        ),
        Without<PlayerCamera>,
    >,
    mut crosshair: ResMut<Crosshair>,
) {
    let Ok(camera) = camera.single() else {
        *crosshair = Crosshair::default();
        return;
    };

    let raycaster = ColliderRaycaster::new(targets.iter().map(
        |(entity, object_id, transform, collider, tags, attributes, switch)| RaycastTarget {
            entity,
            object_id: object_id.copied(),
            center: transform.translation,
            collider: *collider,
            tags,
            attributes,
            switch: switch.map(|switch| switch.light),
        },
    ));
    let origin = camera.translation;
    let look = session.camera.look_direction();

    *crosshair = Crosshair {
        detection: detect(&raycaster, origin, look, INTERACT_RANGE),
        switch: switch_target(&raycaster, origin, look),
    };
}

/// Acts on the rising edge of the interact key.
///
/// Interactables in reach take precedence over a switch behind them.
fn handle_interact_key(
    mut commands: Commands,
    time: Res<Time>,
    session: Res<PlayerSession>,
    crosshair: Res<Crosshair>,
    mut controller: ResMut<InteractionController>,
    link: Option<Res<LinkHandle>>,
    mut was_pressed: Local<bool>,
) {
    let pressed = session.input.interact;
    let rising = pressed && !*was_pressed;
    *was_pressed = pressed;
    if !rising {
        return;
    }

    let link: &dyn InteractionLink = match &link {
        Some(link) => link.0.as_ref(),
        None => &NullLink,
    };

    if !crosshair.detection.interactable {
        if let Some(switch) = crosshair.switch {
            debug!(
                target: LOG_GAMEPLAY,
                "Toggling light {:?} ({:.1} studs)", switch.light, switch.distance
            );
            link.send_toggle(
                &mut commands,
                ToggleLightRequest {
                    light: switch.light,
                },
            );
            return;
        }
    }

    match controller.try_interact(time.elapsed_secs_f64(), &crosshair.detection) {
        Ok(request) => {
            debug!(target: LOG_GAMEPLAY, "Interacting with {:?}", request.target);
            link.send_interact(&mut commands, request);
        }
        Err(refusal) => debug!(target: LOG_GAMEPLAY, "Interaction refused: {refusal}"),
    }
}

pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Crosshair>()
            .init_resource::<InteractionController>()
            .insert_resource(LinkHandle(Box::new(ReplicatedLink)))
            .add_systems(
                Update,
                (
                    update_crosshair,
                    highlight::update_highlight,
                    handle_interact_key,
                )
                    .chain()
                    .in_set(ControlSystems::Interaction),
            )
            .add_systems(
                Update,
                highlight::draw_highlights.run_if(in_state(GameState::InGame)),
            )
            .add_systems(OnExit(GameState::InGame), highlight::clear_highlights);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::time::TimeUpdateStrategy;
    use game_server::shared::{InteractRequest, LightId, ObjectId};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn crosshair_on(target: Entity, interactable: bool) -> Crosshair {
        Crosshair {
            detection: DetectionResult {
                target: Some(target),
                object_id: Some(ObjectId(1)),
                position: Vec3::ZERO,
                distance: 2.0,
                interactable,
            },
            switch: None,
        }
    }

    #[test]
    fn highlight_moves_with_the_crosshair() {
        let mut app = App::new();
        app.init_resource::<Crosshair>()
            .add_systems(Update, highlight::update_highlight);
        let door = app.world_mut().spawn_empty().id();
        let note = app.world_mut().spawn_empty().id();

        app.insert_resource(crosshair_on(door, true));
        app.update();
        assert!(app.world().get::<Highlighted>(door).is_some());

        app.insert_resource(crosshair_on(note, true));
        app.update();
        assert!(app.world().get::<Highlighted>(door).is_none());
        assert!(app.world().get::<Highlighted>(note).is_some());

        app.insert_resource(crosshair_on(note, false));
        app.update();
        assert!(app.world().get::<Highlighted>(note).is_none());
    }

    #[test]
    fn switches_are_highlighted_when_nothing_else_is() {
        let mut crosshair = crosshair_on(Entity::PLACEHOLDER, false);
        let switch = World::new().spawn_empty().id();
        crosshair.switch = Some(SwitchTarget {
            entity: switch,
            light: LightId(0),
            distance: 7.0,
        });
        assert_eq!(highlight_target(&crosshair), Some(switch));

        crosshair.detection.interactable = true;
        assert_eq!(highlight_target(&crosshair), Some(Entity::PLACEHOLDER));
    }

    #[derive(Clone, Default)]
    struct CountingLink(Arc<AtomicUsize>);

    impl InteractionLink for CountingLink {
        fn send_interact(&self, _commands: &mut Commands, _request: InteractRequest) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }

        fn send_toggle(&self, _commands: &mut Commands, _request: ToggleLightRequest) {}
    }

    #[test]
    fn interact_fires_once_per_key_press() {
        let sent = CountingLink::default();
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(200)))
            .init_resource::<PlayerSession>()
            .insert_resource(crosshair_on(Entity::PLACEHOLDER, true))
            .insert_resource(LinkHandle(Box::new(sent.clone())))
            .init_resource::<InteractionController>()
            .add_systems(Update, handle_interact_key);
        app.world_mut()
            .resource_mut::<InteractionController>()
            .initialize();
        let set_key = |app: &mut App, pressed: bool| {
            app.world_mut().resource_mut::<PlayerSession>().input.interact = pressed;
            app.update();
        };

        set_key(&mut app, true);
        assert_eq!(sent.0.load(Ordering::SeqCst), 1);

        // Holding E is not a second press.
        set_key(&mut app, true);
        assert_eq!(sent.0.load(Ordering::SeqCst), 1);

        set_key(&mut app, false);
        set_key(&mut app, true);
        assert_eq!(sent.0.load(Ordering::SeqCst), 2);
    }
}
