//! Crosshair raycasting.

use bevy::math::bounding::RayCast3d;
use bevy::prelude::*;
use game_server::shared::{is_interactable, Attributes, BoxCollider, LightId, ObjectId, Tags};

/// Nearest object along a ray.
#[derive(Debug, Clone, Copy)]
pub struct RayHit<'a> {
    pub entity: Entity,
    pub object_id: Option<ObjectId>,
    pub position: Vec3,
    pub distance: f32,
    pub tags: Option<&'a Tags>,
    pub attributes: Option<&'a Attributes>,
    /// Set when the hit object is a light switch.
    pub switch: Option<LightId>,
}

/// Casts rays against the world.
pub trait Raycaster {
    fn cast(&self, origin: Vec3, direction: Dir3, max_distance: f32) -> Option<RayHit<'_>>;
}

/// Never hits anything.
pub struct NullRaycaster;

impl Raycaster for NullRaycaster {
    fn cast(&self, _origin: Vec3, _direction: Dir3, _max_distance: f32) -> Option<RayHit<'_>> {
        None
    }
}

/// One collider the [`ColliderRaycaster`] can hit.
#[derive(Debug, Clone, Copy)]
pub struct RaycastTarget<'a> {
    pub entity: Entity,
    pub object_id: Option<ObjectId>,
    pub center: Vec3,
    pub collider: BoxCollider,
    pub tags: Option<&'a Tags>,
    pub attributes: Option<&'a Attributes>,
    pub switch: Option<LightId>,
}

/// Ray test against replicated box colliders. Closer boxes occlude farther ones.
#[derive(Default)]
pub struct ColliderRaycaster<'a> {
    targets: Vec<RaycastTarget<'a>>,
}

impl<'a> ColliderRaycaster<'a> {
    pub fn new(targets: impl IntoIterator<Item = RaycastTarget<'a>>) -> Self {
        Self {
            targets: targets.into_iter().collect(),
        }
    }
}

impl Raycaster for ColliderRaycaster<'_> {
    fn cast(&self, origin: Vec3, direction: Dir3, max_distance: f32) -> Option<RayHit<'_>> {
        let ray = RayCast3d::new(origin, direction, max_distance);
        self.targets
            .iter()
            .filter_map(|target| {
                ray.aabb_intersection_at(&target.collider.aabb(target.center))
                    .map(|distance| (target, distance))
            })
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(target, distance)| RayHit {
                entity: target.entity,
                object_id: target.object_id,
                position: origin + *direction * distance,
                distance,
                tags: target.tags,
                attributes: target.attributes,
                switch: target.switch,
            })
    }
}

/// What the crosshair points at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionResult {
    pub target: Option<Entity>,
    pub object_id: Option<ObjectId>,
    pub position: Vec3,
    pub distance: f32,
    pub interactable: bool,
}

impl DetectionResult {
    /// Result of a ray that hit nothing.
    pub fn miss(max_distance: f32) -> Self {
        Self {
            target: None,
            object_id: None,
            position: Vec3::ZERO,
            distance: max_distance,
            interactable: false,
        }
    }
}

/// Casts one ray from `origin` along `look` and classifies the nearest hit.
pub fn detect(
    raycaster: &dyn Raycaster,
    origin: Vec3,
    look: Vec3,
    max_distance: f32,
) -> DetectionResult {
    let Ok(direction) = Dir3::new(look) else {
        return DetectionResult::miss(max_distance);
    };
    match raycaster.cast(origin, direction, max_distance) {
        Some(hit) => DetectionResult {
            target: Some(hit.entity),
            object_id: hit.object_id,
            position: hit.position,
            distance: hit.distance,
            interactable: is_interactable(hit.tags, hit.attributes),
        },
        None => DetectionResult::miss(max_distance),
    }
}
