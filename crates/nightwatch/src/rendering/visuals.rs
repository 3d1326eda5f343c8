use super::RenderAssets;
use crate::networking::LocalPlayer;
use crate::GameState;
use app::LOG_CLIENT;
use bevy::prelude::*;
use game_server::shared::{BoxCollider, Player, PropKind};
use tracing::debug;

/// Spawns meshes for replicated props and players.
pub struct VisualsPlugin;

impl Plugin for VisualsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (spawn_prop_visuals, spawn_player_visuals, hide_local_player)
                .run_if(in_state(GameState::InGame)),
        );
    }
}

#[derive(Component)]
struct HasVisuals;

pub fn prop_color(kind: PropKind) -> Color {
    match kind {
        PropKind::Floor => Color::srgb(0.18, 0.17, 0.16),
        PropKind::Wall => Color::srgb(0.35, 0.33, 0.3),
        PropKind::Door => Color::srgb(0.36, 0.22, 0.12),
        PropKind::Note => Color::srgb(0.9, 0.88, 0.8),
        PropKind::FuseBox => Color::srgb(0.3, 0.35, 0.3),
        PropKind::Switch => Color::srgb(0.85, 0.85, 0.8),
        PropKind::Fixture => Color::srgb(1.0, 0.95, 0.8),
    }
}

fn spawn_prop_visuals(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    props: Query<(Entity, &PropKind, &BoxCollider), Without<HasVisuals>>,
) {
    for (entity, kind, collider) in &props {
        debug!(target: LOG_CLIENT, "Spawning visuals for {:?} {:?}", kind, entity);

        let size = collider.half_extents * 2.0;
        let mesh = meshes.add(Mesh::from(Cuboid::new(size.x, size.y, size.z)));
        let material = materials.add(StandardMaterial {
            base_color: prop_color(*kind),
            perceptual_roughness: 0.9,
            ..default()
        });

        commands.entity(entity).insert((
            Mesh3d(mesh),
            MeshMaterial3d(material),
            Visibility::default(),
            HasVisuals,
        ));
    }
}

fn spawn_player_visuals(
    mut commands: Commands,
    assets: Option<Res<RenderAssets>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    players: Query<(Entity, &Player), Without<HasVisuals>>,
) {
    let Some(assets) = assets else {
        return;
    };
    for (entity, player) in &players {
        debug!(
            target: LOG_CLIENT,
            "Spawning visuals for player {:?} with color {:?}", entity, player.color
        );

        let material = materials.add(StandardMaterial {
            base_color: player.color,
            ..default()
        });

        commands.entity(entity).insert((
            Mesh3d(assets.player_mesh.clone()),
            MeshMaterial3d(material),
            Visibility::default(),
            HasVisuals,
        ));
    }
}

/// The camera sits inside the local avatar.
fn hide_local_player(mut players: Query<&mut Visibility, (With<LocalPlayer>, With<HasVisuals>)>) {
    for mut visibility in &mut players {
        visibility.set_if_neq(Visibility::Hidden);
    }
}
