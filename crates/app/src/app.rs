use paths::PathContext;
use settings::{SettingsError, SettingsStore};
use std::marker::PhantomData;
#[cfg(debug_assertions)]
use std::path::PathBuf;
use thiserror::Error;
use tracing_subscriber::{
    Layer, filter::LevelFilter, filter::filter_fn, fmt, layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub const LOG_MAIN: &str = "main";
pub const LOG_CLIENT: &str = "client";
pub const LOG_SERVER: &str = "server";
pub const LOG_GAMEPLAY: &str = "gameplay";

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to create application directories: {0}")]
    Directories(#[source] std::io::Error),
    #[error("log file path {0} has no parent directory or file name")]
    LogPath(std::path::PathBuf),
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
    #[error("failed to open settings: {0}")]
    Settings(#[from] SettingsError),
}

/// Process-wide context shared by every binary.
pub struct AppContext {
    pub path_context: PathContext,
    pub version: &'static str,
    /// Flushes buffered log lines on drop; must outlive the app.
    _log_guard: tracing_appender::non_blocking::WorkerGuard,
}

impl AppContext {
    pub fn app_id(&self) -> &str {
        self.path_context.app_id()
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn path_context(&self) -> &PathContext {
        &self.path_context
    }

    /// Opens the app's settings file (`<app_id>.settings.ron`).
    pub fn open_settings(&self) -> Result<SettingsStore, StartupError> {
        Ok(SettingsStore::builder()
            .with_settings_file(self.path_context.settings_file())
            .build()?)
    }
}

/// Identity of a binary. Only constants, no behaviour.
pub trait Application: Sized + 'static {
    const APP_ID: &'static str;
    const STUDIO: &'static str = "hollow_lantern";
    const PROJECT_ID: &'static str = "nightwatch";
}

/// Sets up paths and logging, then hands out an [`AppContext`] or a Bevy app.
pub struct AppBuilder<A: Application> {
    context: AppContext,
    _marker: PhantomData<A>,
}

impl<A: Application> AppBuilder<A> {
    pub fn new(version: &'static str) -> Result<Self, StartupError> {
        #[cfg(debug_assertions)]
        let path_context = PathContext::with_base_path(
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("..")
                .join("..")
                .join(".out"),
            A::STUDIO,
            A::PROJECT_ID,
            A::APP_ID,
        );
        #[cfg(not(debug_assertions))]
        let path_context = PathContext::new(A::STUDIO, A::PROJECT_ID, A::APP_ID);

        path_context
            .ensure_directories()
            .map_err(StartupError::Directories)?;

        let log_file_path = path_context.log_file_now();
        let (Some(log_dir), Some(log_filename)) =
            (log_file_path.parent(), log_file_path.file_name())
        else {
            return Err(StartupError::LogPath(log_file_path));
        };

        let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        #[cfg(debug_assertions)]
        let level = LevelFilter::INFO;
        #[cfg(not(debug_assertions))]
        let level = LevelFilter::WARN;

        let file_layer = fmt::Layer::default()
            .with_target(true)
            .with_ansi(false)
            .with_writer(non_blocking)
            .with_filter(filter_fn(move |metadata| metadata.level() <= &level));

        let console_layer = fmt::Layer::default()
            .with_target(true)
            .with_filter(filter_fn(move |metadata| metadata.level() <= &level));

        tracing_subscriber::registry()
            .with(file_layer)
            .with(console_layer)
            .try_init()?;

        tracing::info!(
            target: LOG_MAIN,
            "{} {} starting, data in {}",
            A::APP_ID,
            version,
            path_context.project_root().display()
        );

        Ok(Self {
            context: AppContext {
                path_context,
                version,
                _log_guard: guard,
            },
            _marker: PhantomData,
        })
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Context only, for tools that do not run a Bevy app.
    pub fn build_simple(self) -> AppContext {
        self.context
    }

    /// Builds a Bevy app. Bevy's `LogPlugin` must stay disabled in
    /// `configure` since the subscriber is already installed.
    #[cfg(feature = "bevy")]
    pub fn build_with_bevy(
        self,
        configure: impl FnOnce(bevy::prelude::App, &AppContext) -> bevy::prelude::App,
    ) -> BevyApp<A> {
        let app = configure(bevy::prelude::App::new(), &self.context);
        BevyApp {
            context: self.context,
            app,
            _marker: PhantomData,
        }
    }
}

/// Bevy app bundled with the context that keeps logging alive.
#[cfg(feature = "bevy")]
pub struct BevyApp<A: Application> {
    pub context: AppContext,
    pub app: bevy::prelude::App,
    _marker: PhantomData<A>,
}

#[cfg(feature = "bevy")]
impl<A: Application> BevyApp<A> {
    pub fn run(&mut self) -> bevy::app::AppExit {
        self.app.run()
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub fn app_mut(&mut self) -> &mut bevy::prelude::App {
        &mut self.app
    }
}
