//! Authoritative game server for Nightwatch.
//!
//! Shared by the dedicated `nightwatch_server` binary and the server the
//! client embeds on a background thread, so both run identical gameplay.
//! Clients only hold presentation state; anything that changes the world
//! (movement, interactions, light toggles, power) is decided here.

pub mod error;
pub mod handle;
pub mod interaction;
pub mod movement;
pub mod network;
mod players;
pub mod plugin;
pub mod power;
pub mod settings;
pub mod shared;
pub mod systems;
pub mod world;

pub use error::ServerError;
pub use handle::{configure_headless_server, ServerHandle};
pub use network::{Port, PROTOCOL_ID};
pub use players::eye_position;
pub use plugin::ServerPlugin;
pub use power::{PowerReserve, ToggleRefusal};
pub use settings::ServerSettings;
