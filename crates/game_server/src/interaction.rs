//! Server-side validation of E-key interactions.

use app::LOG_SERVER;
use bevy::prelude::*;
use bevy_replicon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::players::client_eye;
use crate::power::{broadcast_power, PowerGrid};
use crate::shared::rules::{
    ACTIVATED_ATTRIBUTE, INTERACT_RANGE, RESTORES_POWER_ATTRIBUTE, SERVER_RANGE_TOLERANCE,
};
use crate::shared::{
    is_interactable, AttributeValue, Attributes, BoxCollider, InteractRequest, ObjectId, Player,
    PlayerOwner, Tags,
};

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InteractionRejection {
    #[error("object is not interactable")]
    NotInteractable,
    #[error("object is out of reach ({distance:.1} > {max:.1} studs)")]
    OutOfReach { distance: f32, max: f32 },
}

/// Checks a request against the server's view of the world.
///
/// Distance is measured from the eye to the closest point of the object's
/// collider, or to its origin when it has none. Returns that distance.
pub fn validate_interaction(
    eye: Vec3,
    object: &Transform,
    collider: Option<&BoxCollider>,
    tags: Option<&Tags>,
    attributes: Option<&Attributes>,
) -> Result<f32, InteractionRejection> {
    if !is_interactable(tags, attributes) {
        return Err(InteractionRejection::NotInteractable);
    }
    let target = match collider {
        Some(collider) => collider.closest_point(object.translation, eye),
        None => object.translation,
    };
    let distance = eye.distance(target);
    let max = INTERACT_RANGE + SERVER_RANGE_TOLERANCE;
    if distance > max {
        return Err(InteractionRejection::OutOfReach { distance, max });
    }
    Ok(distance)
}

/// Observer applying an accepted interaction.
///
/// Every accepted interaction flips the object's activation flag. Objects
/// that restore power refill the grid as well.
pub fn handle_interact_request(
    trigger: On<FromClient<InteractRequest>>,
    mut commands: Commands,
    players: Query<(&PlayerOwner, &Transform), With<Player>>,
    mut objects: Query<
        (
            Entity,
            &ObjectId,
            &Transform,
            Option<&BoxCollider>,
            Option<&Tags>,
            Option<&mut Attributes>,
        ),
        Without<Player>,
    >,
    mut grid: ResMut<PowerGrid>,
) {
    let FromClient { client_id, message } = trigger.event();
    let Some(eye) = client_eye(*client_id, &players) else {
        warn!(target: LOG_SERVER, "Interaction from unknown client {:?}", client_id);
        return;
    };

    let Some((entity, _, transform, collider, tags, attributes)) = objects
        .iter_mut()
        .find(|(_, id, ..)| **id == message.target)
    else {
        debug!(target: LOG_SERVER, "Interaction with unknown object {:?}", message.target);
        return;
    };

    if let Err(rejection) =
        validate_interaction(eye, transform, collider, tags, attributes.as_deref())
    {
        debug!(
            target: LOG_SERVER,
            "Rejected interaction with {:?}: {rejection}", message.target
        );
        return;
    }

    let restores_power = match attributes {
        Some(mut attributes) => {
            let activated = attributes.flag(ACTIVATED_ATTRIBUTE).unwrap_or(false);
            attributes.set(ACTIVATED_ATTRIBUTE, AttributeValue::Bool(!activated));
            attributes.flag(RESTORES_POWER_ATTRIBUTE).unwrap_or(false)
        }
        None => {
            commands.entity(entity).insert(
                Attributes::default().with(ACTIVATED_ATTRIBUTE, AttributeValue::Bool(true)),
            );
            false
        }
    };
    info!(target: LOG_SERVER, "Client {:?} used {:?}", client_id, message.target);

    if restores_power {
        grid.reserve.reset();
        info!(target: LOG_SERVER, "Power restored by {:?}", message.target);
        broadcast_power(&mut commands, &grid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::rules::INTERACTABLE_TAG;

    fn door() -> (Transform, BoxCollider, Tags) {
        (
            Transform::from_xyz(0.0, 2.0, 0.0),
            BoxCollider::new(Vec3::new(3.0, 4.0, 0.3)),
            Tags::new(["Door", INTERACTABLE_TAG]),
        )
    }

    #[test]
    fn nearby_interactable_object_is_accepted() {
        let (transform, collider, tags) = door();
        let eye = Vec3::new(0.0, 1.6, 3.0);
        let distance =
            validate_interaction(eye, &transform, Some(&collider), Some(&tags), None).unwrap();
        assert!((distance - 2.85).abs() < 1e-4);
    }

    #[test]
    fn latency_tolerance_extends_reach() {
        let (transform, collider, tags) = door();
        let eye = Vec3::new(0.0, 1.6, 0.15 + INTERACT_RANGE + 1.0);
        assert!(validate_interaction(eye, &transform, Some(&collider), Some(&tags), None).is_ok());
    }

    #[test]
    fn far_object_is_rejected() {
        let (transform, collider, tags) = door();
        let eye = Vec3::new(0.0, 1.6, 20.0);
        assert!(matches!(
            validate_interaction(eye, &transform, Some(&collider), Some(&tags), None),
            Err(InteractionRejection::OutOfReach { .. })
        ));
    }

    #[test]
    fn plain_object_is_rejected() {
        let (transform, collider, _) = door();
        let tags = Tags::new(["Wall"]);
        assert_eq!(
            validate_interaction(Vec3::ZERO, &transform, Some(&collider), Some(&tags), None),
            Err(InteractionRejection::NotInteractable)
        );
    }
}
