//! Power grid: a finite reserve spent by switching lights on.
//!
//! Power only changes through events (toggles and refills); it never decays
//! over time.

use app::LOG_SERVER;
use bevy::prelude::*;
use bevy_replicon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::players::client_eye;
use crate::shared::rules::{LIGHT_SWITCH_RANGE, SERVER_RANGE_TOLERANCE};
use crate::shared::{
    BoxCollider, LightFixture, LightSwitch, Player, PlayerOwner, PowerChanged, ToggleLightRequest,
};

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ToggleRefusal {
    #[error("not enough power: {available:.1} available, {required:.1} required")]
    InsufficientPower { available: f32, required: f32 },
}

/// Remaining power, clamped to `[0, capacity]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerReserve {
    level: f32,
    capacity: f32,
    toggle_cost: f32,
}

impl PowerReserve {
    /// A full reserve. Negative inputs are treated as zero.
    pub fn new(capacity: f32, toggle_cost: f32) -> Self {
        let capacity = capacity.max(0.0);
        Self {
            level: capacity,
            capacity,
            toggle_cost: toggle_cost.max(0.0),
        }
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn capacity(&self) -> f32 {
        self.capacity
    }

    pub fn toggle_cost(&self) -> f32 {
        self.toggle_cost
    }

    pub fn percent(&self) -> f32 {
        if self.capacity <= 0.0 {
            return 0.0;
        }
        (self.level / self.capacity * 100.0).clamp(0.0, 100.0)
    }

    pub fn set_level(&mut self, level: f32) {
        self.level = level.clamp(0.0, self.capacity);
    }

    pub fn reset(&mut self) {
        self.level = self.capacity;
    }

    /// Flips a light that is currently `currently_on` and returns its new state.
    ///
    /// Switching off is free and always succeeds. Switching on costs
    /// `toggle_cost` and is refused, leaving the reserve untouched, when less
    /// than that remains.
    pub fn toggle(&mut self, currently_on: bool) -> Result<bool, ToggleRefusal> {
        if currently_on {
            return Ok(false);
        }
        if self.level <= 0.0 || self.level < self.toggle_cost {
            return Err(ToggleRefusal::InsufficientPower {
                available: self.level,
                required: self.toggle_cost,
            });
        }
        self.level = (self.level - self.toggle_cost).max(0.0);
        Ok(true)
    }
}

/// Server-authoritative power state.
#[derive(Resource, Debug, Clone, Copy)]
pub struct PowerGrid {
    pub reserve: PowerReserve,
}

impl PowerGrid {
    pub fn new(capacity: f32, toggle_cost: f32) -> Self {
        Self {
            reserve: PowerReserve::new(capacity, toggle_cost),
        }
    }

    pub fn message(&self) -> PowerChanged {
        PowerChanged {
            percent: self.reserve.percent(),
        }
    }
}

pub(crate) fn broadcast_power(commands: &mut Commands, grid: &PowerGrid) {
    commands.server_trigger(ToClients {
        mode: SendMode::Broadcast,
        message: grid.message(),
    });
}

/// Observer applying a client's light toggle.
///
/// The request is only honoured when the player stands within switch range of
/// a switch wired to the requested light.
pub fn handle_toggle_light(
    trigger: On<FromClient<ToggleLightRequest>>,
    mut commands: Commands,
    players: Query<(&PlayerOwner, &Transform), With<Player>>,
    switches: Query<(&LightSwitch, &Transform, &BoxCollider)>,
    mut fixtures: Query<&mut LightFixture>,
    mut grid: ResMut<PowerGrid>,
) {
    let FromClient { client_id, message } = trigger.event();
    let Some(eye) = client_eye(*client_id, &players) else {
        warn!(target: LOG_SERVER, "Toggle request from unknown client {:?}", client_id);
        return;
    };

    let reach = LIGHT_SWITCH_RANGE + SERVER_RANGE_TOLERANCE;
    let in_reach = switches.iter().any(|(switch, transform, collider)| {
        switch.light == message.light
            && eye.distance(collider.closest_point(transform.translation, eye)) <= reach
    });
    if !in_reach {
        debug!(
            target: LOG_SERVER,
            "Rejected toggle of {:?}: no switch within {:.1} studs", message.light, reach
        );
        return;
    }

    let Some(mut fixture) = fixtures.iter_mut().find(|fixture| fixture.id == message.light) else {
        warn!(target: LOG_SERVER, "Switch wired to missing light {:?}", message.light);
        return;
    };

    match grid.reserve.toggle(fixture.on) {
        Ok(now_on) => {
            fixture.on = now_on;
            info!(
                target: LOG_SERVER,
                "Light {:?} switched {} ({:.0}% power left)",
                message.light,
                if now_on { "on" } else { "off" },
                grid.reserve.percent()
            );
            broadcast_power(&mut commands, &grid);
        }
        Err(refusal) => {
            info!(target: LOG_SERVER, "Light {:?} stays off: {refusal}", message.light);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switching_on_spends_the_toggle_cost() {
        let mut reserve = PowerReserve::new(100.0, 10.0);
        assert_eq!(reserve.toggle(false), Ok(true));
        assert_eq!(reserve.level(), 90.0);
    }

    #[test]
    fn switching_off_is_free_even_without_power() {
        let mut reserve = PowerReserve::new(100.0, 10.0);
        reserve.set_level(0.0);
        assert_eq!(reserve.toggle(true), Ok(false));
        assert_eq!(reserve.level(), 0.0);
    }

    #[test]
    fn switching_on_without_power_changes_nothing() {
        let mut reserve = PowerReserve::new(100.0, 10.0);
        reserve.set_level(0.0);
        let before = reserve;
        assert!(matches!(
            reserve.toggle(false),
            Err(ToggleRefusal::InsufficientPower { .. })
        ));
        assert_eq!(reserve, before);
    }

    #[test]
    fn partial_reserve_below_cost_is_refused() {
        let mut reserve = PowerReserve::new(100.0, 10.0);
        reserve.set_level(5.0);
        assert_eq!(
            reserve.toggle(false),
            Err(ToggleRefusal::InsufficientPower {
                available: 5.0,
                required: 10.0
            })
        );
        assert_eq!(reserve.level(), 5.0);
    }

    #[test]
    fn ten_toggles_drain_a_full_grid() {
        let mut reserve = PowerReserve::new(100.0, 10.0);
        for _ in 0..10 {
            assert_eq!(reserve.toggle(false), Ok(true));
        }
        assert_eq!(reserve.level(), 0.0);
        assert!(reserve.toggle(false).is_err());
    }

    #[test]
    fn level_and_percent_stay_in_range() {
        let mut reserve = PowerReserve::new(200.0, 10.0);
        reserve.set_level(500.0);
        assert_eq!(reserve.percent(), 100.0);
        reserve.set_level(-3.0);
        assert_eq!(reserve.level(), 0.0);
        reserve.set_level(50.0);
        assert_eq!(reserve.percent(), 25.0);
        reserve.reset();
        assert_eq!(reserve.level(), 200.0);
    }
}
