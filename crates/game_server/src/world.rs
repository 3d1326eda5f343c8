//! Static world layout and per-player spawn data.
//!
//! The map is a row of three rooms south of an open yard. Every room has a
//! ceiling light, a wall switch wired to it and a door. Notes and the fuse
//! box are scattered across the rooms.

use bevy::color::palettes::css::*;
use bevy::prelude::*;
use bevy_replicon::prelude::Replicated;

use crate::shared::rules::{
    ACTIVATED_ATTRIBUTE, INTERACTABLE_ATTRIBUTE, INTERACTABLE_TAG, RESTORES_POWER_ATTRIBUTE,
};
use crate::shared::*;

const ROOM_SIZE: f32 = 14.0;
const WALL_HEIGHT: f32 = 5.0;
const WALL_THICKNESS: f32 = 0.5;
const ROOM_CENTERS: [Vec3; 3] = [
    Vec3::new(-20.0, 0.0, -20.0),
    Vec3::new(0.0, 0.0, -20.0),
    Vec3::new(20.0, 0.0, -20.0),
];

/// Cycles through a fixed palette so nearby players look different.
#[derive(Resource, Debug)]
pub struct PlayerColorAssigner {
    palette: Vec<Color>,
    next_index: usize,
}

impl Default for PlayerColorAssigner {
    fn default() -> Self {
        Self {
            palette: vec![
                RED.into(),
                BLUE.into(),
                GREEN.into(),
                YELLOW.into(),
                ORANGE.into(),
                PURPLE.into(),
            ],
            next_index: 0,
        }
    }
}

impl PlayerColorAssigner {
    pub fn next_color(&mut self) -> Color {
        let color = self.palette[self.next_index];
        self.next_index = (self.next_index + 1) % self.palette.len();
        color
    }
}

/// Spawn positions in the yard, handed out round-robin.
#[derive(Resource, Debug)]
pub struct SpawnPoints {
    points: Vec<Vec3>,
    next_index: usize,
}

impl Default for SpawnPoints {
    fn default() -> Self {
        Self {
            points: vec![
                Vec3::new(0.0, 0.0, 10.0),
                Vec3::new(-4.0, 0.0, 10.0),
                Vec3::new(4.0, 0.0, 10.0),
                Vec3::new(0.0, 0.0, 14.0),
            ],
            next_index: 0,
        }
    }
}

impl SpawnPoints {
    pub fn next_point(&mut self) -> Vec3 {
        let point = self.points[self.next_index];
        self.next_index = (self.next_index + 1) % self.points.len();
        point
    }
}

#[derive(Default)]
struct ObjectIds(u32);

impl ObjectIds {
    fn next(&mut self) -> ObjectId {
        self.0 += 1;
        ObjectId(self.0)
    }
}

/// Bundle shared by every world object.
fn prop(ids: &mut ObjectIds, kind: PropKind, center: Vec3, size: Vec3) -> impl Bundle {
    (
        ids.next(),
        kind,
        Transform::from_translation(center),
        BoxCollider::new(size),
        Replicated,
    )
}

fn interactable(extra: &[&str]) -> Tags {
    Tags::new(extra.iter().copied().chain([INTERACTABLE_TAG]))
}

pub fn spawn_world(mut commands: Commands) {
    let mut ids = ObjectIds::default();

    commands.spawn(prop(
        &mut ids,
        PropKind::Floor,
        Vec3::new(0.0, -0.25, 0.0),
        Vec3::new(80.0, 0.5, 80.0),
    ));

    for (index, center) in ROOM_CENTERS.into_iter().enumerate() {
        spawn_room(&mut commands, &mut ids, LightId(index as u16), center);
    }

    // Notes are flagged through the attribute rather than the tag.
    for (room, text) in [
        (0, "The lights drink more than they should."),
        (1, "Fuse box is in the east room."),
    ] {
        commands.spawn((
            prop(
                &mut ids,
                PropKind::Note,
                ROOM_CENTERS[room] + Vec3::new(-4.0, 1.0, -4.0),
                Vec3::new(0.6, 0.05, 0.8),
            ),
            Tags::new(["Note"]),
            Attributes::default()
                .with(INTERACTABLE_ATTRIBUTE, AttributeValue::Bool(true))
                .with(ACTIVATED_ATTRIBUTE, AttributeValue::Bool(false))
                .with("Text", AttributeValue::Text(text.into())),
        ));
    }

    commands.spawn((
        prop(
            &mut ids,
            PropKind::FuseBox,
            ROOM_CENTERS[2] + Vec3::new(ROOM_SIZE / 2.0 - 0.6, 1.5, 0.0),
            Vec3::new(0.4, 1.2, 0.8),
        ),
        interactable(&["FuseBox"]),
        Attributes::default()
            .with(ACTIVATED_ATTRIBUTE, AttributeValue::Bool(false))
            .with(RESTORES_POWER_ATTRIBUTE, AttributeValue::Bool(true)),
    ));
}

fn spawn_room(commands: &mut Commands, ids: &mut ObjectIds, light: LightId, center: Vec3) {
    let half = ROOM_SIZE / 2.0;
    let wall_y = WALL_HEIGHT / 2.0;

    // Back and side walls; the front is left open around the door.
    for (offset, size) in [
        (
            Vec3::new(0.0, wall_y, -half),
            Vec3::new(ROOM_SIZE, WALL_HEIGHT, WALL_THICKNESS),
        ),
        (
            Vec3::new(-half, wall_y, 0.0),
            Vec3::new(WALL_THICKNESS, WALL_HEIGHT, ROOM_SIZE),
        ),
        (
            Vec3::new(half, wall_y, 0.0),
            Vec3::new(WALL_THICKNESS, WALL_HEIGHT, ROOM_SIZE),
        ),
    ] {
        commands.spawn(prop(ids, PropKind::Wall, center + offset, size));
    }

    commands.spawn((
        prop(
            ids,
            PropKind::Door,
            center + Vec3::new(0.0, 2.0, half),
            Vec3::new(3.0, 4.0, 0.3),
        ),
        interactable(&["Door"]),
        Attributes::default().with(ACTIVATED_ATTRIBUTE, AttributeValue::Bool(false)),
    ));

    commands.spawn((
        prop(
            ids,
            PropKind::Fixture,
            center + Vec3::new(0.0, WALL_HEIGHT - 0.3, 0.0),
            Vec3::new(1.2, 0.2, 1.2),
        ),
        LightFixture { id: light, on: false },
    ));

    commands.spawn((
        prop(
            ids,
            PropKind::Switch,
            center + Vec3::new(3.0, 1.4, half - 0.35),
            Vec3::new(0.3, 0.5, 0.2),
        ),
        LightSwitch { light },
        Tags::new(["LightSwitch"]),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn spawned_world() -> World {
        let mut app = App::new();
        app.add_systems(Startup, spawn_world);
        app.update();
        std::mem::take(app.world_mut())
    }

    #[test]
    fn object_ids_are_unique() {
        let mut world = spawned_world();
        let ids: Vec<ObjectId> = world.query::<&ObjectId>().iter(&world).copied().collect();
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(ids.len(), unique.len());
    }

    #[test]
    fn every_fixture_has_a_switch() {
        let mut world = spawned_world();
        let lights: HashSet<LightId> = world
            .query::<&LightFixture>()
            .iter(&world)
            .map(|fixture| fixture.id)
            .collect();
        let wired: HashSet<LightId> = world
            .query::<&LightSwitch>()
            .iter(&world)
            .map(|switch| switch.light)
            .collect();
        assert_eq!(lights.len(), ROOM_CENTERS.len());
        assert_eq!(lights, wired);
    }

    #[test]
    fn lights_start_off() {
        let mut world = spawned_world();
        assert!(world.query::<&LightFixture>().iter(&world).all(|f| !f.on));
    }

    #[test]
    fn fuse_box_is_interactable_and_restores_power() {
        let mut world = spawned_world();
        let (tags, attributes) = world
            .query::<(&PropKind, &Tags, &Attributes)>()
            .iter(&world)
            .find(|(kind, ..)| **kind == PropKind::FuseBox)
            .map(|(_, tags, attributes)| (tags.clone(), attributes.clone()))
            .unwrap();
        assert!(is_interactable(Some(&tags), Some(&attributes)));
        assert_eq!(attributes.flag(RESTORES_POWER_ATTRIBUTE), Some(true));
    }

    #[test]
    fn walls_are_not_interactable() {
        let mut world = spawned_world();
        let walls: Vec<_> = world
            .query::<(&PropKind, Option<&Tags>, Option<&Attributes>)>()
            .iter(&world)
            .filter(|(kind, ..)| **kind == PropKind::Wall)
            .map(|(_, tags, attributes)| is_interactable(tags, attributes))
            .collect();
        assert!(!walls.is_empty());
        assert!(walls.iter().all(|interactable| !interactable));
    }

    #[test]
    fn spawn_points_and_colors_wrap_around() {
        let mut points = SpawnPoints::default();
        let first = points.next_point();
        for _ in 1..points.points.len() {
            points.next_point();
        }
        assert_eq!(points.next_point(), first);

        let mut colors = PlayerColorAssigner::default();
        let first = colors.next_color();
        for _ in 1..colors.palette.len() {
            colors.next_color();
        }
        assert_eq!(colors.next_color(), first);
    }
}
