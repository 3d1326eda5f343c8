//! Diagnostic server systems.

use app::LOG_SERVER;
use bevy::prelude::*;
use std::time::Duration;

use crate::power::PowerGrid;
use crate::shared::{LightFixture, Player};

/// Ticks between two heartbeat log lines.
const HEARTBEAT_INTERVAL: u64 = 200;

#[derive(Resource, Debug, Default)]
pub struct HeartbeatState {
    last_tick: Option<Duration>,
    tick_count: u64,
}

impl HeartbeatState {
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

/// Logs tick timing together with a short summary of the world.
pub fn heartbeat_system(
    mut state: ResMut<HeartbeatState>,
    time_fixed: Res<Time<Fixed>>,
    time_real: Res<Time<Real>>,
    grid: Option<Res<PowerGrid>>,
    players: Query<(), With<Player>>,
    lights: Query<&LightFixture>,
) {
    let now = time_real.elapsed();
    let Some(last_tick) = state.last_tick.replace(now) else {
        tracing::debug!(target: LOG_SERVER, "Server heartbeat initialized");
        return;
    };
    state.tick_count += 1;

    if state.tick_count % HEARTBEAT_INTERVAL == 0 {
        let target_ms = time_fixed.timestep().as_secs_f64() * 1000.0;
        let real_ms = now.saturating_sub(last_tick).as_secs_f64() * 1000.0;
        tracing::info!(
            target: LOG_SERVER,
            "Server tick #{} | target: {:.2}ms | actual: {:.2}ms | players: {} | lights on: {} | power: {:.0}%",
            state.tick_count,
            target_ms,
            real_ms,
            players.iter().count(),
            lights.iter().filter(|light| light.on).count(),
            grid.map(|grid| grid.reserve.percent()).unwrap_or(0.0)
        );
    }
}
