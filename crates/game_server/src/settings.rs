use serde::{Deserialize, Serialize};
use settings::Settings;

use crate::shared::rules::{LIGHT_TOGGLE_COST, POWER_CAPACITY};

/// `[server]` section of the server settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub port: u16,
    pub max_clients: usize,
    /// Simulation ticks per second.
    pub tick_rate: f64,
    pub power_capacity: f32,
    pub toggle_cost: f32,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 5000,
            max_clients: 8,
            tick_rate: 20.0,
            power_capacity: POWER_CAPACITY,
            toggle_cost: LIGHT_TOGGLE_COST,
        }
    }
}

impl Settings for ServerSettings {
    const SECTION: &'static str = "server";
}
