//! Types shared between server and client.
//!
//! Replicated components, network events and gameplay constants. Both sides
//! add [`ProtocolPlugin`] so registration always matches.

pub mod components;
pub mod events;
pub mod rules;

pub use components::*;
pub use events::*;

use bevy::prelude::*;
use bevy_replicon::prelude::*;

/// Registers every replicated component and network event.
///
/// Must be added after `RepliconPlugins`.
pub struct ProtocolPlugin;

impl Plugin for ProtocolPlugin {
    fn build(&self, app: &mut App) {
        app
            // Players
            .replicate::<Player>()
            .replicate::<PlayerIdentity>()
            .replicate::<Transform>()
            .replicate::<Velocity>()
            // World objects
            .replicate::<ObjectId>()
            .replicate::<BoxCollider>()
            .replicate::<PropKind>()
            .replicate::<Tags>()
            .replicate::<Attributes>()
            .replicate::<LightFixture>()
            .replicate::<LightSwitch>()
            // Events
            .add_client_event::<PlayerMovement>(Channel::Unreliable)
            .add_client_event::<InteractRequest>(Channel::Ordered)
            .add_client_event::<ToggleLightRequest>(Channel::Ordered)
            .add_server_event::<PowerChanged>(Channel::Ordered);
    }
}
