//! Client networking: connection, local player tracking and smoothing.

mod connection;
mod interpolation;

pub use connection::{LocalClientId, LocalPlayer};
pub use interpolation::InterpolationState;

use bevy::prelude::*;

pub struct NetworkingPlugin;

impl Plugin for NetworkingPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            connection::ConnectionPlugin,
            interpolation::InterpolationPlugin,
        ));
    }
}
