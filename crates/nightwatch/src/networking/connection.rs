//! Connecting to the embedded or a remote server.

use app::LOG_CLIENT;
use bevy::prelude::*;
use bevy_replicon::prelude::*;
use bevy_replicon_renet::{
    netcode::{ClientAuthentication, NetcodeClientTransport},
    renet::{ConnectionConfig, RenetClient},
    RenetChannelsExt,
};
use game_server::shared::{ObjectId, Player, PlayerIdentity};
use game_server::{ServerHandle, ServerSettings, PROTOCOL_ID};
use settings::SettingsArc;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::time::SystemTime;
use tracing::{info, warn};

use crate::settings::ClientSettings;
use crate::utils::{cleanup, remove};
use crate::GameState;

/// Netcode id this client authenticated with.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalClientId(pub u64);

/// Marks the avatar controlled by this client.
#[derive(Component, Debug)]
pub struct LocalPlayer;

/// Starts the in-process server once, when configured to host one.
fn host_embedded_server(
    mut commands: Commands,
    settings: Res<SettingsArc<ClientSettings>>,
    existing: Option<Res<ServerHandle>>,
) -> Result {
    if !settings.host_embedded_server || existing.is_some() {
        return Ok(());
    }
    let server = ServerHandle::start_embedded(ServerSettings {
        port: settings.port,
        ..Default::default()
    })?;
    commands.insert_resource(server);
    info!(target: LOG_CLIENT, "Hosting embedded server");
    Ok(())
}

/// Address to connect to, or `None` while the embedded server is starting.
fn server_address(
    settings: &ClientSettings,
    embedded: Option<&ServerHandle>,
) -> Result<Option<SocketAddr>, std::net::AddrParseError> {
    if let Some(server) = embedded {
        return Ok(server
            .port()
            .map(|port| SocketAddr::new(Ipv4Addr::LOCALHOST.into(), port)));
    }
    let ip: IpAddr = settings.server_address.parse()?;
    Ok(Some(SocketAddr::new(ip, settings.port)))
}

fn connect_to_server(
    mut commands: Commands,
    channels: Res<RepliconChannels>,
    settings: Res<SettingsArc<ClientSettings>>,
    server: Option<Res<ServerHandle>>,
    client: Option<Res<RenetClient>>,
) -> Result {
    if client.is_some() {
        return Ok(());
    }
    let Some(server_addr) = server_address(&settings, server.as_deref())? else {
        return Ok(());
    };

    let client = RenetClient::new(ConnectionConfig {
        server_channels_config: channels.server_configs(),
        client_channels_config: channels.client_configs(),
        ..Default::default()
    });

    let current_time = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH)?;
    let client_id = current_time.as_millis() as u64;
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    let authentication = ClientAuthentication::Unsecure {
        client_id,
        protocol_id: PROTOCOL_ID,
        server_addr,
        user_data: None,
    };
    let transport = NetcodeClientTransport::new(current_time, authentication, socket)?;

    commands.insert_resource(client);
    commands.insert_resource(transport);
    commands.insert_resource(LocalClientId(client_id));

    info!(
        target: LOG_CLIENT,
        "Connecting to {} as client {}", server_addr, client_id
    );
    Ok(())
}

/// Drops a failed attempt so the next frame starts a new one.
fn retry_failed_connection(mut commands: Commands, client: Option<Res<RenetClient>>) {
    if client.is_some_and(|client| client.is_disconnected()) {
        warn!(target: LOG_CLIENT, "Connection attempt failed, retrying");
        commands.remove_resource::<RenetClient>();
        commands.remove_resource::<NetcodeClientTransport>();
        commands.remove_resource::<LocalClientId>();
    }
}

fn enter_game(mut next_state: ResMut<NextState<GameState>>) {
    info!(target: LOG_CLIENT, "Connected, entering game");
    next_state.set(GameState::InGame);
}

fn leave_game_on_disconnect(mut next_state: ResMut<NextState<GameState>>) {
    warn!(target: LOG_CLIENT, "Lost connection to server, reconnecting");
    next_state.set(GameState::Connecting);
}

pub(super) fn mark_local_player(
    mut commands: Commands,
    local_id: Option<Res<LocalClientId>>,
    players: Query<(Entity, &PlayerIdentity), Added<PlayerIdentity>>,
) {
    let Some(local_id) = local_id else {
        return;
    };
    for (entity, identity) in &players {
        if identity.client_id == local_id.0 {
            commands.entity(entity).insert(LocalPlayer);
            info!(target: LOG_CLIENT, "Local player is {:?}", entity);
        }
    }
}

pub struct ConnectionPlugin;

impl Plugin for ConnectionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Connecting), host_embedded_server)
            .add_systems(
                Update,
                (
                    (retry_failed_connection, connect_to_server)
                        .chain()
                        .run_if(in_state(GameState::Connecting)),
                    enter_game
                        .run_if(in_state(GameState::Connecting))
                        .run_if(in_state(ClientState::Connected)),
                    leave_game_on_disconnect
                        .run_if(in_state(GameState::InGame))
                        .run_if(in_state(ClientState::Disconnected)),
                    mark_local_player,
                ),
            )
            .add_systems(
                OnExit(GameState::InGame),
                (
                    remove::<RenetClient>,
                    remove::<NetcodeClientTransport>,
                    remove::<LocalClientId>,
                    cleanup::<Player>,
                    cleanup::<ObjectId>,
                ),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_address_comes_from_settings() {
        let settings = ClientSettings {
            host_embedded_server: false,
            server_address: "10.0.0.7".into(),
            port: 6000,
            ..Default::default()
        };
        let addr = server_address(&settings, None).unwrap();
        assert_eq!(addr, Some("10.0.0.7:6000".parse().unwrap()));
    }

    #[test]
    fn bad_address_is_an_error() {
        let settings = ClientSettings {
            server_address: "not an ip".into(),
            ..Default::default()
        };
        assert!(server_address(&settings, None).is_err());
    }

    #[test]
    fn only_the_own_avatar_is_marked_local() {
        let mut app = App::new();
        app.insert_resource(LocalClientId(7))
            .add_systems(Update, mark_local_player);
        let own = app
            .world_mut()
            .spawn(PlayerIdentity { client_id: 7 })
            .id();
        let other = app
            .world_mut()
            .spawn(PlayerIdentity { client_id: 8 })
            .id();
        app.update();

        assert!(app.world().get::<LocalPlayer>(own).is_some());
        assert!(app.world().get::<LocalPlayer>(other).is_none());
    }
}
