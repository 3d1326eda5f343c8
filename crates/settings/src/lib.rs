//! Section-based settings persisted as a single RON delta file.
//!
//! Every section type registers its defaults; the store only writes the
//! fields a user actually changed, so new defaults reach existing installs.

#[cfg(feature = "bevy")]
mod bevy_adapter;
mod errors;
mod store;

#[cfg(feature = "bevy")]
pub use bevy_adapter::*;
pub use errors::SettingsError;
pub use store::{SettingsStore, SettingsStoreBuilder};

use serde::{Serialize, de::DeserializeOwned};

/// A typed section of the settings file.
pub trait Settings: Default + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Top-level key of this section inside the settings file.
    const SECTION: &'static str;

    fn name() -> &'static str {
        Self::SECTION
    }
}
