//! Running the server on a background thread of the client process.

use app::LOG_SERVER;
use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy_replicon::prelude::*;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};
use tracing::info;

use crate::error::ServerError;
use crate::network::{PortStorage, ServerReadyFlag};
use crate::plugin::ServerPlugin;
use crate::settings::ServerSettings;

/// Main loop rate of a headless server app. Simulation runs on `FixedUpdate`.
const LOOP_RATE_HZ: f64 = 60.0;

/// Set from the owning thread to stop the server app.
#[derive(Resource, Clone, Default)]
pub struct ShutdownFlag(pub Arc<AtomicBool>);

/// Adds everything a headless server needs to an empty app.
pub fn configure_headless_server(app: &mut App, settings: ServerSettings) {
    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / LOOP_RATE_HZ,
        ))),
        StatesPlugin,
        RepliconPlugins,
        ServerPlugin::new(settings),
    ));
}

fn exit_on_shutdown(flag: Res<ShutdownFlag>, mut exit: MessageWriter<AppExit>) {
    if flag.0.load(Ordering::Acquire) {
        info!(target: LOG_SERVER, "Shutdown requested, stopping server");
        exit.write(AppExit::Success);
    }
}

/// Owner side of an embedded server.
///
/// Dropping the handle asks the server to stop without waiting for it.
#[derive(Resource)]
pub struct ServerHandle {
    ready: ServerReadyFlag,
    port: PortStorage,
    shutdown: ShutdownFlag,
    thread: Option<JoinHandle<()>>,
}

impl ServerHandle {
    /// Starts a server on its own thread and returns immediately.
    pub fn start_embedded(settings: ServerSettings) -> Result<Self, ServerError> {
        let ready = ServerReadyFlag::default();
        let port = PortStorage::default();
        let shutdown = ShutdownFlag::default();

        let thread = {
            let (ready, port, shutdown) = (ready.clone(), port.clone(), shutdown.clone());
            thread::Builder::new()
                .name("nightwatch-server".into())
                .spawn(move || {
                    let mut app = App::new();
                    app.insert_resource(ready)
                        .insert_resource(port)
                        .insert_resource(shutdown)
                        .add_systems(Last, exit_on_shutdown);
                    configure_headless_server(&mut app, settings);
                    app.run();
                })?
        };

        info!(target: LOG_SERVER, "Embedded server thread started");
        Ok(Self {
            ready,
            port,
            shutdown,
            thread: Some(thread),
        })
    }

    pub fn is_ready(&self) -> bool {
        self.ready.0.load(Ordering::Acquire)
    }

    /// Bound port, once the server is listening.
    pub fn port(&self) -> Option<u16> {
        self.is_ready()
            .then(|| self.port.0.load(Ordering::Acquire))
    }

    /// Blocks until the server listens and returns its port.
    pub fn wait_until_ready(&self, timeout: Duration) -> Result<u16, ServerError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(port) = self.port() {
                return Ok(port);
            }
            if self.thread.as_ref().is_none_or(JoinHandle::is_finished) {
                return Err(ServerError::ThreadPanicked);
            }
            if Instant::now() >= deadline {
                return Err(ServerError::StartupTimeout(timeout));
            }
            thread::sleep(Duration::from_millis(10));
        }
    }

    /// Stops the server and waits for its thread.
    pub fn shutdown(mut self) -> Result<(), ServerError> {
        self.shutdown.0.store(true, Ordering::Release);
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| ServerError::ThreadPanicked),
            None => Ok(()),
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.shutdown.0.store(true, Ordering::Release);
    }
}
