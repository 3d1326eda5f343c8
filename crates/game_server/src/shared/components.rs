//! Replicated components shared by server and client.
//!
//! Both sides register these through [`ProtocolPlugin`](super::ProtocolPlugin),
//! so registration order always matches.

use bevy::math::bounding::Aabb3d;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::rules::{INTERACTABLE_ATTRIBUTE, INTERACTABLE_TAG};

/// Player entity marker with the player's assigned color.
#[derive(Component, Debug, Clone, Serialize, Deserialize, Reflect)]
#[reflect(Component)]
pub struct Player {
    pub color: Color,
}

/// Network id of the client owning a replicated player entity.
///
/// Clients compare this with their own transport id to find their avatar.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize, Reflect)]
#[reflect(Component)]
pub struct PlayerIdentity {
    pub client_id: u64,
}

#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize, Reflect)]
#[reflect(Component)]
pub struct Velocity {
    pub linear: Vec3,
}

/// Links a player entity to its `ConnectedClient` entity.
///
/// **Server-only**, never replicated.
#[derive(Component, Debug, Clone, Copy)]
pub struct PlayerOwner {
    pub client_entity: Entity,
}

/// Stable identifier of a world object, used in network requests.
#[derive(
    Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ObjectId(pub u32);

/// Axis-aligned box around an object's `Transform` translation.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxCollider {
    pub half_extents: Vec3,
}

impl BoxCollider {
    pub fn new(size: Vec3) -> Self {
        Self {
            half_extents: size * 0.5,
        }
    }

    pub fn aabb(&self, center: Vec3) -> Aabb3d {
        Aabb3d::new(center, self.half_extents)
    }

    /// Point of the box closest to `point` (the point itself when inside).
    pub fn closest_point(&self, center: Vec3, point: Vec3) -> Vec3 {
        point.clamp(center - self.half_extents, center + self.half_extents)
    }
}

/// What an object looks like; drives client-side visuals only.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropKind {
    Floor,
    Wall,
    Door,
    Note,
    FuseBox,
    Switch,
    Fixture,
}

/// Set of string tags attached to an object, kept sorted and deduplicated.
#[derive(Component, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Tags(Vec<String>);

impl From<Vec<String>> for Tags {
    fn from(tags: Vec<String>) -> Self {
        Self::new(tags)
    }
}

impl From<Tags> for Vec<String> {
    fn from(tags: Tags) -> Self {
        tags.0
    }
}

impl Tags {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tags: Vec<String> = tags.into_iter().map(Into::into).collect();
        tags.sort();
        tags.dedup();
        Self(tags)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.binary_search_by(|t| t.as_str().cmp(tag)).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Bool(bool),
    Number(f32),
    Text(String),
}

/// Named attributes attached to an object.
#[derive(Component, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes(BTreeMap<String, AttributeValue>);

impl Attributes {
    pub fn with(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.0.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.0.insert(name.into(), value);
    }

    /// `Some` only when the attribute exists and is a boolean.
    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.0.get(name) {
            Some(AttributeValue::Bool(value)) => Some(*value),
            _ => None,
        }
    }
}

/// An object is interactable when it carries the interactable tag or the
/// interactable attribute set to `true`.
pub fn is_interactable(tags: Option<&Tags>, attributes: Option<&Attributes>) -> bool {
    let tagged = tags.is_some_and(|tags| tags.contains(INTERACTABLE_TAG));
    let flagged = attributes
        .and_then(|attributes| attributes.flag(INTERACTABLE_ATTRIBUTE))
        .unwrap_or(false);
    tagged || flagged
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Reflect,
)]
pub struct LightId(pub u16);

/// A ceiling light. `on` is server-authoritative.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize, Reflect)]
#[reflect(Component)]
pub struct LightFixture {
    pub id: LightId,
    pub on: bool,
}

/// A wall switch controlling the fixture with the same [`LightId`].
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize, Reflect)]
#[reflect(Component)]
pub struct LightSwitch {
    pub light: LightId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::rules::ACTIVATED_ATTRIBUTE;

    #[test]
    fn tag_alone_makes_an_object_interactable() {
        let tags = Tags::new(["Door", INTERACTABLE_TAG]);
        assert!(is_interactable(Some(&tags), None));
    }

    #[test]
    fn attribute_alone_makes_an_object_interactable() {
        let attributes =
            Attributes::default().with(INTERACTABLE_ATTRIBUTE, AttributeValue::Bool(true));
        assert!(is_interactable(None, Some(&attributes)));
    }

    #[test]
    fn false_or_non_boolean_attribute_is_not_enough() {
        let off = Attributes::default().with(INTERACTABLE_ATTRIBUTE, AttributeValue::Bool(false));
        let text =
            Attributes::default().with(INTERACTABLE_ATTRIBUTE, AttributeValue::Text("yes".into()));
        assert!(!is_interactable(Some(&Tags::new(["Wall"])), Some(&off)));
        assert!(!is_interactable(None, Some(&text)));
        assert!(!is_interactable(None, None));
    }

    #[test]
    fn tags_are_deduplicated() {
        let tags = Tags::new(["b", "a", "b"]);
        assert_eq!(tags.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn unsorted_tags_from_the_wire_are_found() {
        let tags: Tags = ron::from_str(r#"["Interactable", "Door", "Door"]"#).unwrap();
        assert!(tags.contains(INTERACTABLE_TAG));
        assert!(tags.contains("Door"));
        assert_eq!(tags.iter().count(), 2);
    }

    #[test]
    fn attribute_flag_ignores_other_types() {
        let mut attributes = Attributes::default();
        attributes.set(ACTIVATED_ATTRIBUTE, AttributeValue::Number(1.0));
        assert_eq!(attributes.flag(ACTIVATED_ATTRIBUTE), None);
        attributes.set(ACTIVATED_ATTRIBUTE, AttributeValue::Bool(true));
        assert_eq!(attributes.flag(ACTIVATED_ATTRIBUTE), Some(true));
    }

    #[test]
    fn closest_point_clamps_onto_the_box() {
        let collider = BoxCollider::new(Vec3::new(2.0, 2.0, 2.0));
        let point = collider.closest_point(Vec3::ZERO, Vec3::new(5.0, 0.5, -3.0));
        assert_eq!(point, Vec3::new(1.0, 0.5, -1.0));
    }
}
