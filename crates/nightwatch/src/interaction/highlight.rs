//! Outline for whatever the crosshair can currently be used on.

use bevy::color::palettes::css::GOLD;
use bevy::prelude::*;
use game_server::shared::BoxCollider;

use super::Crosshair;

#[derive(Component, Debug)]
pub struct Highlighted;

/// The entity that should carry [`Highlighted`] this frame.
pub fn highlight_target(crosshair: &Crosshair) -> Option<Entity> {
    if crosshair.detection.interactable {
        return crosshair.detection.target;
    }
    crosshair.switch.map(|switch| switch.entity)
}

pub fn update_highlight(
    mut commands: Commands,
    crosshair: Res<Crosshair>,
    highlighted: Query<Entity, With<Highlighted>>,
) {
    let target = highlight_target(&crosshair);
    for entity in &highlighted {
        if Some(entity) != target {
            commands.entity(entity).remove::<Highlighted>();
        }
    }
    if let Some(target) = target {
        if !highlighted.contains(target) {
            commands.entity(target).try_insert(Highlighted);
        }
    }
}

pub fn draw_highlights(
    mut gizmos: Gizmos,
    highlighted: Query<(&Transform, &BoxCollider), With<Highlighted>>,
) {
    for (transform, collider) in &highlighted {
        let outline = Transform::from_translation(transform.translation)
            .with_scale(collider.half_extents * 2.1);
        gizmos.cuboid(outline, GOLD);
    }
}

pub fn clear_highlights(mut commands: Commands, highlighted: Query<Entity, With<Highlighted>>) {
    for entity in &highlighted {
        commands.entity(entity).remove::<Highlighted>();
    }
}
