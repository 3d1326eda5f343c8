use bevy::prelude::*;
use bevy_replicon::prelude::*;

use crate::shared::rules::EYE_HEIGHT;
use crate::shared::{Player, PlayerOwner};

/// Eye position of the player owned by `client`, if it has one.
pub(crate) fn client_eye(
    client: ClientId,
    players: &Query<(&PlayerOwner, &Transform), With<Player>>,
) -> Option<Vec3> {
    let client_entity = client.entity()?;
    players
        .iter()
        .find(|(owner, _)| owner.client_entity == client_entity)
        .map(|(_, transform)| eye_position(transform.translation))
}

pub fn eye_position(origin: Vec3) -> Vec3 {
    origin + Vec3::Y * EYE_HEIGHT
}
