use app::{AppBuilder, Application, LOG_MAIN};
use bevy::prelude::AppExit;
use color_eyre::{eyre::eyre, Result};
use game_server::{configure_headless_server, ServerSettings};
use tracing::info;

struct NightwatchServer;

impl Application for NightwatchServer {
    const APP_ID: &'static str = "nightwatch_server";
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let builder = AppBuilder::<NightwatchServer>::new(env!("CARGO_PKG_VERSION"))?;
    let store = builder.context().open_settings()?;
    store.register::<ServerSettings>()?;
    let settings = ServerSettings::clone(&store.get::<ServerSettings>()?);

    info!(
        target: LOG_MAIN,
        "Dedicated server on port {} for up to {} players",
        settings.port,
        settings.max_clients
    );

    let mut app = builder.build_with_bevy(|mut app, _context| {
        configure_headless_server(&mut app, settings);
        app
    });
    match app.run() {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => Err(eyre!("server exited with code {code}")),
    }
}
