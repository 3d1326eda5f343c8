//! Client view of the server's power grid.

use app::LOG_GAMEPLAY;
use bevy::prelude::*;
use game_server::shared::PowerChanged;
use tracing::info;

/// Last power percentage announced by the server.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct PowerGauge {
    percent: f32,
}

impl Default for PowerGauge {
    fn default() -> Self {
        Self { percent: 100.0 }
    }
}

impl PowerGauge {
    pub fn percent(&self) -> f32 {
        self.percent
    }

    pub fn is_empty(&self) -> bool {
        self.percent <= 0.0
    }

    pub fn set(&mut self, percent: f32) {
        self.percent = percent.clamp(0.0, 100.0);
    }
}

fn receive_power(power: On<PowerChanged>, mut gauge: ResMut<PowerGauge>) {
    let was_empty = gauge.is_empty();
    gauge.set(power.percent);
    if gauge.is_empty() && !was_empty {
        info!(target: LOG_GAMEPLAY, "The power is out");
    } else {
        info!(target: LOG_GAMEPLAY, "Power at {:.0}%", gauge.percent());
    }
}

pub struct PowerPlugin;

impl Plugin for PowerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PowerGauge>().add_observer(receive_power);
    }
}
