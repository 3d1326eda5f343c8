use bevy::{
    app::App,
    ecs::resource::Resource,
    prelude::{Deref, DerefMut},
};
use std::sync::Arc;

use crate::{Settings, SettingsError, SettingsStore};

/// Shared handle to the store backing all registered sections.
#[derive(Resource, Clone)]
pub struct SettingsStoreRef(pub Arc<SettingsStore>);

/// Snapshot of one settings section, inserted as a Bevy resource.
#[derive(Resource, Deref, DerefMut, Clone)]
pub struct SettingsArc<T: Send + Sync + 'static>(pub Arc<T>);

pub trait AppSettingsExt {
    fn insert_settings_store(&mut self, store: SettingsStore) -> &mut Self;

    /// Registers `S` with the store and seeds its `SettingsArc<S>` resource.
    fn register_settings_section<S: Settings>(&mut self) -> Result<&mut Self, SettingsError>;
}

impl AppSettingsExt for App {
    fn insert_settings_store(&mut self, store: SettingsStore) -> &mut Self {
        self.insert_resource(SettingsStoreRef(Arc::new(store)))
    }

    fn register_settings_section<S: Settings>(&mut self) -> Result<&mut Self, SettingsError> {
        let store = self
            .world()
            .get_resource::<SettingsStoreRef>()
            .map(|store| store.0.clone())
            .ok_or(SettingsError::Invalid("settings store not inserted"))?;

        if !store.is_registered::<S>() {
            store.register::<S>()?;
        }
        let snapshot = store.get::<S>()?;
        Ok(self.insert_resource(SettingsArc::<S>(snapshot)))
    }
}
