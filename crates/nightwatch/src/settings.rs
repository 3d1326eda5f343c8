use serde::{Deserialize, Serialize};
use settings::Settings;

/// `client` section of the settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Start a server inside this process instead of joining `server_address`.
    pub host_embedded_server: bool,
    pub server_address: String,
    pub port: u16,
    /// Radians per pixel of mouse movement.
    pub mouse_sensitivity: f32,
    pub field_of_view_degrees: f32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            host_embedded_server: true,
            server_address: "127.0.0.1".into(),
            port: 5000,
            mouse_sensitivity: 0.002,
            field_of_view_degrees: 70.0,
        }
    }
}

impl Settings for ClientSettings {
    const SECTION: &'static str = "client";
}
