use crate::utils::cleanup;
use crate::GameState;
use app::LOG_CLIENT;
use bevy::prelude::*;
use game_server::shared::LightFixture;
use tracing::debug;

/// Point light intensity of a fixture that is switched on, in lumens.
const FIXTURE_LUMENS: f32 = 800_000.0;

pub struct LightingPlugin;

impl Plugin for LightingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::InGame), setup_lighting)
            .add_systems(OnExit(GameState::InGame), cleanup::<LightingEntity>)
            .add_systems(
                Update,
                (attach_fixture_lights, sync_fixture_lights)
                    .chain()
                    .run_if(in_state(GameState::InGame)),
            );
    }
}

#[derive(Component)]
struct LightingEntity;

pub fn fixture_intensity(fixture: &LightFixture) -> f32 {
    if fixture.on {
        FIXTURE_LUMENS
    } else {
        0.0
    }
}

fn setup_lighting(mut commands: Commands, ambient_light: Option<ResMut<AmbientLight>>) {
    // Barely enough to make out walls with every fixture off.
    if let Some(mut ambient_light) = ambient_light {
        ambient_light.brightness = 40.0;
        ambient_light.color = Color::srgb(0.55, 0.6, 0.8);
    }

    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            illuminance: 150.0,
            color: Color::srgb(0.5, 0.55, 0.8),
            ..default()
        },
        Transform::from_xyz(-12.0, 18.0, 12.0).looking_at(Vec3::ZERO, Vec3::Y),
        LightingEntity,
        Name::new("Moonlight"),
    ));
}

fn attach_fixture_lights(
    mut commands: Commands,
    fixtures: Query<(Entity, &LightFixture), Without<PointLight>>,
) {
    for (entity, fixture) in &fixtures {
        commands.entity(entity).insert(PointLight {
            intensity: fixture_intensity(fixture),
            range: 30.0,
            shadows_enabled: true,
            color: Color::srgb(1.0, 0.9, 0.7),
            ..default()
        });
    }
}

fn sync_fixture_lights(
    mut fixtures: Query<(&LightFixture, &mut PointLight), Changed<LightFixture>>,
) {
    for (fixture, mut light) in &mut fixtures {
        light.intensity = fixture_intensity(fixture);
        debug!(
            target: LOG_CLIENT,
            "Light {:?} is now {}",
            fixture.id,
            if fixture.on { "on" } else { "off" }
        );
    }
}
