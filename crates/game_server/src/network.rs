//! Server networking setup and connection handling.
//!
//! This module handles:
//! - Server initialization with bevy_replicon_renet
//! - Port binding with automatic fallback
//! - Client connection/disconnection handling

use app::LOG_SERVER;
use bevy::prelude::*;
use bevy_replicon::prelude::*;
use bevy_replicon::shared::backend::connected_client::NetworkId;
use bevy_replicon_renet::{
    netcode::{NetcodeServerTransport, ServerAuthentication, ServerConfig},
    renet::{ConnectionConfig, RenetServer},
    RenetChannelsExt,
};
use std::{
    net::{Ipv4Addr, UdpSocket},
    sync::{
        atomic::{AtomicBool, AtomicU16, Ordering},
        Arc,
    },
    time::SystemTime,
};
use tracing::{info, warn};

use crate::error::ServerError;
use crate::power::PowerGrid;
use crate::shared::*;
use crate::world::{PlayerColorAssigner, SpawnPoints};

pub const PROTOCOL_ID: u64 = 0x4e57_0001;

/// Requested server port and client limit.
#[derive(Resource, Debug, Clone, Copy)]
pub struct NetworkConfig {
    pub port: u16,
    pub max_clients: usize,
}

/// Port the server actually bound to.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Port(pub u16);

/// Set once the transport is listening; read by [`ServerHandle`](crate::ServerHandle).
#[derive(Resource, Clone, Default)]
pub struct ServerReadyFlag(pub Arc<AtomicBool>);

/// Shares the bound port with the thread that started the server.
#[derive(Resource, Clone, Default)]
pub struct PortStorage(pub Arc<AtomicU16>);

/// Binds the UDP socket and inserts the renet server resources.
pub fn setup_networking(
    mut commands: Commands,
    channels: Res<RepliconChannels>,
    config: Res<NetworkConfig>,
    ready_flag: Res<ServerReadyFlag>,
    port_storage: Res<PortStorage>,
) -> Result {
    let server = RenetServer::new(ConnectionConfig {
        server_channels_config: channels.server_configs(),
        client_channels_config: channels.client_configs(),
        ..Default::default()
    });

    let current_time = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_err(ServerError::from)?;

    let (socket, actual_port) = find_free_port(config.port)?;
    if actual_port != config.port {
        warn!(
            target: LOG_SERVER,
            "Port {} was in use, using port {} instead", config.port, actual_port
        );
    }

    let server_config = ServerConfig {
        current_time,
        max_clients: config.max_clients,
        protocol_id: PROTOCOL_ID,
        authentication: ServerAuthentication::Unsecure,
        public_addresses: Default::default(),
    };
    let transport = NetcodeServerTransport::new(server_config, socket).map_err(ServerError::from)?;

    commands.insert_resource(server);
    commands.insert_resource(transport);
    commands.insert_resource(Port(actual_port));

    port_storage.0.store(actual_port, Ordering::Release);
    ready_flag.0.store(true, Ordering::Release);

    info!(target: LOG_SERVER, "Server listening on 0.0.0.0:{}", actual_port);
    Ok(())
}

/// Binds `start_port` or, when taken, one of the next nine ports.
pub fn find_free_port(start_port: u16) -> Result<(UdpSocket, u16), ServerError> {
    const MAX_ATTEMPTS: u16 = 10;

    for offset in 0..MAX_ATTEMPTS {
        let Some(port) = start_port.checked_add(offset) else {
            break;
        };
        match UdpSocket::bind((Ipv4Addr::UNSPECIFIED, port)) {
            Ok(socket) => return Ok((socket, port)),
            Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(ServerError::NoFreePort {
        start: start_port,
        end: start_port.saturating_add(MAX_ATTEMPTS - 1),
    })
}

/// Spawns a replicated avatar for every newly connected client.
pub fn handle_client_connections(
    mut commands: Commands,
    new_clients: Query<Entity, Added<ConnectedClient>>,
    network_ids: Query<&NetworkId>,
    mut color_assigner: ResMut<PlayerColorAssigner>,
    mut spawn_points: ResMut<SpawnPoints>,
) {
    for client_entity in &new_clients {
        let Ok(network_id) = network_ids.get(client_entity) else {
            warn!(
                target: LOG_SERVER,
                "Connected client {:?} has no network id, skipping", client_entity
            );
            continue;
        };
        let client_id = network_id.get();

        commands.spawn((
            Player {
                color: color_assigner.next_color(),
            },
            PlayerIdentity { client_id },
            PlayerOwner { client_entity },
            Transform::from_translation(spawn_points.next_point()),
            Velocity::default(),
            Replicated,
        ));

        info!(
            target: LOG_SERVER,
            "Spawned player for client {} (entity {:?})", client_id, client_entity
        );
    }
}

/// Sends the current power level to clients once they may receive events.
pub fn sync_power_to_new_clients(
    mut commands: Commands,
    authorized: Query<Entity, Added<AuthorizedClient>>,
    grid: Res<PowerGrid>,
) {
    for client_entity in &authorized {
        commands.server_trigger(ToClients {
            mode: SendMode::Direct(ClientId::Client(client_entity)),
            message: grid.message(),
        });
    }
}

/// Despawns the avatars of clients that left.
pub fn handle_client_disconnections(
    mut commands: Commands,
    mut disconnected_clients: RemovedComponents<ConnectedClient>,
    players: Query<(Entity, &PlayerOwner)>,
) {
    for disconnected_client in disconnected_clients.read() {
        let mut despawned = 0;
        for (player_entity, owner) in &players {
            if owner.client_entity == disconnected_client {
                commands.entity(player_entity).despawn();
                despawned += 1;
            }
        }

        info!(
            target: LOG_SERVER,
            "Client {:?} disconnected ({} entities despawned)", disconnected_client, despawned
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taken_port_falls_back_to_the_next_one() {
        let (held, port) = find_free_port(0).unwrap();
        let bound = held.local_addr().unwrap().port();
        assert_eq!(port, 0);

        let (_socket, fallback) = find_free_port(bound).unwrap();
        assert!(fallback > bound && fallback < bound + 10);
    }
}
