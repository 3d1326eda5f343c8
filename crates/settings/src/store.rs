use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ron::value::{Map as RonMap, Value as RonValue};
use serde::{Serialize, de::DeserializeOwned};

use crate::{Settings, SettingsError};

fn to_ron_map<T: Serialize>(value: &T) -> Result<RonMap, SettingsError> {
    let text = ron::to_string(value)?;
    match ron::from_str::<RonValue>(&text) {
        Ok(RonValue::Map(map)) => Ok(map),
        Ok(_) => Err(SettingsError::Invalid("section must serialize to a map")),
        Err(_) => Err(SettingsError::Invalid("re-parse serialized section")),
    }
}

fn from_ron_map<T: DeserializeOwned>(map: &RonMap) -> Result<T, SettingsError> {
    RonValue::Map(map.clone())
        .into_rust()
        .map_err(|_| SettingsError::Invalid("deserialize section"))
}

/// Overlays `delta` onto `base`, descending into nested maps.
fn overlay(base: &RonMap, delta: &RonMap) -> RonMap {
    let mut merged = base.clone();
    for (key, delta_value) in delta.iter() {
        let next = match (merged.get(key), delta_value) {
            (Some(RonValue::Map(base_sub)), RonValue::Map(delta_sub)) => {
                RonValue::Map(overlay(base_sub, delta_sub))
            }
            _ => delta_value.clone(),
        };
        merged.insert(key.clone(), next);
    }
    merged
}

/// Keeps only the entries of `current` that differ from `defaults`.
fn difference(current: &RonMap, defaults: &RonMap) -> RonMap {
    let mut out = RonMap::new();
    for (key, value) in current.iter() {
        match (defaults.get(key), value) {
            (Some(RonValue::Map(default_sub)), RonValue::Map(current_sub)) => {
                let nested = difference(current_sub, default_sub);
                if !nested.is_empty() {
                    out.insert(key.clone(), RonValue::Map(nested));
                }
            }
            (Some(default_value), _) if default_value == value => {}
            _ => {
                out.insert(key.clone(), value.clone());
            }
        }
    }
    out
}

fn read_deltas(path: &Path) -> Result<HashMap<String, RonValue>, SettingsError> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(HashMap::new());
    }
    ron::from_str(&content).map_err(|_| SettingsError::Invalid("parse settings file"))
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Builder for [`SettingsStore`].
#[derive(Default)]
pub struct SettingsStoreBuilder {
    settings_file: Option<PathBuf>,
}

impl SettingsStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.settings_file = Some(path.into());
        self
    }

    pub fn build(self) -> Result<SettingsStore, SettingsError> {
        let file_path = self
            .settings_file
            .ok_or(SettingsError::Invalid("settings file not specified"))?;

        if let Some(dir) = file_path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let deltas = read_deltas(&file_path)?;
        tracing::debug!(
            "Settings store opened at {} ({} stored sections)",
            file_path.display(),
            deltas.len()
        );

        Ok(SettingsStore {
            file_path,
            deltas: RwLock::new(deltas),
            sections: RwLock::new(HashMap::new()),
        })
    }
}

struct Section {
    defaults: RonMap,
    effective: RonMap,
}

/// Thread-safe store of typed settings sections.
pub struct SettingsStore {
    file_path: PathBuf,
    deltas: RwLock<HashMap<String, RonValue>>,
    sections: RwLock<HashMap<&'static str, Section>>,
}

impl SettingsStore {
    pub fn builder() -> SettingsStoreBuilder {
        SettingsStoreBuilder::new()
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn is_registered<T: Settings>(&self) -> bool {
        read(&self.sections).contains_key(T::name())
    }

    /// Registers a section, merging any stored delta over its defaults.
    pub fn register<T: Settings>(&self) -> Result<(), SettingsError> {
        let name = T::name();
        if self.is_registered::<T>() {
            return Err(SettingsError::Invalid("section already registered"));
        }

        let defaults = to_ron_map(&T::default())?;
        let effective = match read(&self.deltas).get(name) {
            Some(RonValue::Map(delta)) => overlay(&defaults, delta),
            Some(_) => {
                tracing::warn!("Ignoring non-map delta stored for settings section '{name}'");
                defaults.clone()
            }
            None => defaults.clone(),
        };

        write(&self.sections).insert(
            name,
            Section {
                defaults,
                effective,
            },
        );
        Ok(())
    }

    /// Snapshot of the effective value of a section.
    pub fn get<T: Settings>(&self) -> Result<Arc<T>, SettingsError> {
        self.try_get::<T>()?.ok_or(SettingsError::NotRegistered)
    }

    pub fn try_get<T: Settings>(&self) -> Result<Option<Arc<T>>, SettingsError> {
        let sections = read(&self.sections);
        let Some(section) = sections.get(T::name()) else {
            return Ok(None);
        };
        let value = from_ron_map(&section.effective)?;
        Ok(Some(Arc::new(value)))
    }

    /// Mutates a section and persists only its difference from the defaults.
    pub fn update<T, F>(&self, mutator: F) -> Result<(), SettingsError>
    where
        T: Settings,
        F: FnOnce(&mut T),
    {
        let name = T::name();
        let mut current: T = {
            let sections = read(&self.sections);
            let section = sections.get(name).ok_or(SettingsError::NotRegistered)?;
            from_ron_map(&section.effective)?
        };
        mutator(&mut current);
        let updated = to_ron_map(&current)?;

        let delta = {
            let mut sections = write(&self.sections);
            let section = sections.get_mut(name).ok_or(SettingsError::NotRegistered)?;
            let delta = difference(&updated, &section.defaults);
            section.effective = updated;
            delta
        };

        {
            let mut deltas = write(&self.deltas);
            if delta.is_empty() {
                deltas.remove(name);
            } else {
                deltas.insert(name.to_string(), RonValue::Map(delta));
            }
        }

        self.persist()
    }

    /// Re-reads the delta file and re-merges every registered section.
    pub fn reload(&self) -> Result<(), SettingsError> {
        let deltas = read_deltas(&self.file_path)?;
        {
            let mut sections = write(&self.sections);
            for (name, section) in sections.iter_mut() {
                section.effective = match deltas.get(*name) {
                    Some(RonValue::Map(delta)) => overlay(&section.defaults, delta),
                    _ => section.defaults.clone(),
                };
            }
        }
        *write(&self.deltas) = deltas;
        Ok(())
    }

    fn persist(&self) -> Result<(), SettingsError> {
        let clean: HashMap<String, RonValue> = read(&self.deltas)
            .iter()
            .filter(|(_, value)| !matches!(value, RonValue::Map(map) if map.is_empty()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let text = ron::ser::to_string_pretty(&clean, ron::ser::PrettyConfig::default())?;
        let tmp = self.file_path.with_extension("tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.file_path)?;
        tracing::debug!("Persisted settings to {}", self.file_path.display());
        Ok(())
    }
}
