//! Server plugin for the game server.
//!
//! This plugin encapsulates all server-side logic and can be used in:
//! - Embedded server mode (running in a separate thread within the client)
//! - Dedicated server mode (standalone server binary)

use bevy::prelude::*;
use bevy_replicon::prelude::*;
use bevy_replicon_renet::RepliconRenetPlugins;

use crate::interaction::handle_interact_request;
use crate::movement::{apply_velocity, process_player_movement};
use crate::network::{
    handle_client_connections, handle_client_disconnections, setup_networking,
    sync_power_to_new_clients, NetworkConfig, PortStorage, ServerReadyFlag,
};
use crate::power::{handle_toggle_light, PowerGrid};
use crate::settings::ServerSettings;
use crate::shared::ProtocolPlugin;
use crate::systems::{heartbeat_system, HeartbeatState};
use crate::world::{spawn_world, PlayerColorAssigner, SpawnPoints};

/// Main server plugin. Requires `RepliconPlugins` and `StatesPlugin`.
pub struct ServerPlugin {
    pub settings: ServerSettings,
}

impl ServerPlugin {
    pub fn new(settings: ServerSettings) -> Self {
        Self { settings }
    }
}

impl Plugin for ServerPlugin {
    fn build(&self, app: &mut App) {
        let settings = &self.settings;
        app.add_plugins((RepliconRenetPlugins, ProtocolPlugin))
            // Resources
            .insert_resource(NetworkConfig {
                port: settings.port,
                max_clients: settings.max_clients,
            })
            .insert_resource(Time::<Fixed>::from_hz(settings.tick_rate))
            .insert_resource(PowerGrid::new(
                settings.power_capacity,
                settings.toggle_cost,
            ))
            .init_resource::<ServerReadyFlag>()
            .init_resource::<PortStorage>()
            .init_resource::<PlayerColorAssigner>()
            .init_resource::<SpawnPoints>()
            .init_resource::<HeartbeatState>()
            // Client events
            .add_observer(process_player_movement)
            .add_observer(handle_interact_request)
            .add_observer(handle_toggle_light)
            // Systems
            .add_systems(Startup, (setup_networking, spawn_world))
            .add_systems(
                PreUpdate,
                (
                    handle_client_connections,
                    handle_client_disconnections,
                    sync_power_to_new_clients,
                )
                    .after(ServerSystems::Receive)
                    .run_if(in_state(ServerState::Running)),
            )
            .add_systems(
                FixedUpdate,
                (apply_velocity, heartbeat_system).run_if(in_state(ServerState::Running)),
            );
    }
}
