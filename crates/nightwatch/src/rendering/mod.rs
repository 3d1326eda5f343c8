mod lighting;
mod visuals;

use crate::GameState;
use bevy::prelude::*;

pub use lighting::{fixture_intensity, LightingPlugin};
pub use visuals::{prop_color, VisualsPlugin};

/// Meshes shared by every replicated entity of a kind.
#[derive(Resource)]
pub struct RenderAssets {
    pub player_mesh: Handle<Mesh>,
}

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((LightingPlugin, VisualsPlugin))
            .add_systems(OnEnter(GameState::InGame), setup_render_assets)
            .add_systems(OnExit(GameState::InGame), cleanup_render_assets);
    }
}

fn setup_render_assets(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    let player_mesh = meshes.add(Mesh::from(Capsule3d::new(0.5, 1.0)));
    commands.insert_resource(RenderAssets { player_mesh });
}

fn cleanup_render_assets(mut commands: Commands) {
    commands.remove_resource::<RenderAssets>();
}
