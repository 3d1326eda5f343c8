mod controls;
mod footsteps;
mod interaction;
mod networking;
mod power;
mod rendering;
mod sanity;
mod session;
mod settings;
mod utils;

use crate::controls::ControlsPlugin;
use crate::footsteps::FootstepsPlugin;
use crate::interaction::InteractionPlugin;
use crate::networking::NetworkingPlugin;
use crate::power::PowerPlugin;
use crate::rendering::RenderingPlugin;
use crate::sanity::SanityPlugin;
use crate::settings::ClientSettings;

use app::{AppBuilder, Application, LOG_MAIN};
use bevy::{log::LogPlugin, prelude::*};
use bevy_replicon::prelude::*;
use color_eyre::eyre::eyre;
use bevy_replicon_renet::RepliconRenetPlugins;
use game_server::shared::ProtocolPlugin;
use ::settings::AppSettingsExt;
use tracing::info;

/// Where the client is in its connection flow.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    #[default]
    Connecting,
    InGame,
}

struct Nightwatch;

impl Application for Nightwatch {
    const APP_ID: &'static str = "nightwatch";
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let mut app = AppBuilder::<Nightwatch>::new(env!("CARGO_PKG_VERSION"))?.build_with_bevy(
        |mut app, _context| {
            app.add_plugins(
                DefaultPlugins
                    .build()
                    .disable::<LogPlugin>()
                    .set(WindowPlugin {
                        primary_window: Some(Window {
                            title: "Nightwatch".to_string(),
                            ..default()
                        }),
                        ..default()
                    }),
            )
            .add_plugins((RepliconPlugins, RepliconRenetPlugins, ProtocolPlugin));
            app
        },
    );

    let store = app.context().open_settings()?;
    app.app_mut()
        .insert_settings_store(store)
        .register_settings_section::<ClientSettings>()?
        .init_state::<GameState>()
        .add_plugins((
            ControlsPlugin,
            InteractionPlugin,
            FootstepsPlugin,
            SanityPlugin,
            PowerPlugin,
            NetworkingPlugin,
            RenderingPlugin,
        ));

    info!(target: LOG_MAIN, "Starting client");
    match app.run() {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => Err(eyre!("client exited with code {code}")),
    }
}
