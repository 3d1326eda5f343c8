//! Studio/project/app-scoped filesystem locations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Directory name used below the platform data dir in production builds.
const INSTALL_DIR: &str = "Nightwatch";

#[derive(Debug, Clone)]
pub struct PathContext {
    base_path: Arc<Path>,
    studio: String,
    project_id: String,
    app_id: &'static str,
}

impl PathContext {
    /// Resolves the base path from the platform's local data directory.
    ///
    /// Falls back to the working directory on platforms without one.
    pub fn new(
        studio: impl Into<String>,
        project_id: impl Into<String>,
        app_id: &'static str,
    ) -> Self {
        let base_path = dirs::data_local_dir()
            .map(|dir| dir.join(INSTALL_DIR))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::with_base_path(base_path, studio, project_id, app_id)
    }

    pub fn with_base_path(
        base_path: PathBuf,
        studio: impl Into<String>,
        project_id: impl Into<String>,
        app_id: &'static str,
    ) -> Self {
        Self {
            base_path: base_path.into(),
            studio: studio.into(),
            project_id: project_id.into(),
            app_id,
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn app_id(&self) -> &'static str {
        self.app_id
    }

    /// `<base>/<studio>/<project_id>`
    pub fn project_root(&self) -> PathBuf {
        self.base_path.join(&self.studio).join(&self.project_id)
    }

    /// `<root>/<app_id>.settings.ron`
    pub fn settings_file(&self) -> PathBuf {
        self.project_root()
            .join(format!("{}.settings.ron", self.app_id))
    }

    /// `<root>/assets/`
    pub fn assets_dir(&self) -> PathBuf {
        self.project_root().join("assets")
    }

    /// `<root>/logs/`
    pub fn logs_dir(&self) -> PathBuf {
        self.project_root().join("logs")
    }

    /// `<root>/logs/<app_id>.<timestamp>.log`
    pub fn log_file(&self, timestamp: &str) -> PathBuf {
        self.logs_dir()
            .join(format!("{}.{}.log", self.app_id, timestamp))
    }

    pub fn log_file_now(&self) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
        self.log_file(&timestamp)
    }

    pub fn ensure_directories(&self) -> std::io::Result<()> {
        for dir in [self.project_root(), self.assets_dir(), self.logs_dir()] {
            if !dir.exists() {
                std::fs::create_dir_all(&dir)?;
            }
        }
        Ok(())
    }
}
