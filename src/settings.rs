use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::button::ButtonConfig;
use crate::recommend::RecommendationConfig;

/// Overrides `ButtonConfig::debounce_ms` when set to an integer.
pub const DEBOUNCE_ENV_VAR: &str = "SCHOLARHUB_DEBOUNCE_MS";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlatformSettings {
    pub buttons: ButtonConfig,
    pub recommendations: RecommendationConfig,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<PlatformSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let mut data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!(
                    "Ignoring unreadable settings at {}: {}",
                    path.display(),
                    err
                );
                PlatformSettings::default()
            })
        } else {
            PlatformSettings::default()
        };

        apply_env_overrides(&mut data);

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn snapshot(&self) -> PlatformSettings {
        self.read().clone()
    }

    pub fn buttons(&self) -> ButtonConfig {
        self.read().buttons.clone()
    }

    pub fn recommendations(&self) -> RecommendationConfig {
        self.read().recommendations.clone()
    }

    pub fn update_buttons(&self, config: ButtonConfig) -> Result<()> {
        let mut guard = self.write();
        guard.buttons = config;
        self.persist(&guard)
    }

    pub fn update_recommendations(&self, config: RecommendationConfig) -> Result<()> {
        let mut guard = self.write();
        guard.recommendations = config;
        self.persist(&guard)
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let mut data: PlatformSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid settings in {}", self.path.display()))?;
        apply_env_overrides(&mut data);
        *self.write() = data;
        Ok(())
    }

    fn persist(&self, data: &PlatformSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, PlatformSettings> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, PlatformSettings> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn apply_env_overrides(data: &mut PlatformSettings) {
    if let Ok(value) = std::env::var(DEBOUNCE_ENV_VAR) {
        match value.trim().parse::<u64>() {
            Ok(ms) => data.buttons.debounce_ms = ms,
            Err(_) => log::warn!("Ignoring {}={:?}: not an integer", DEBOUNCE_ENV_VAR, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();

        assert_eq!(store.buttons().loading_text, "Processing...");
        assert_eq!(store.recommendations().default_limit, 5);
    }

    #[test]
    fn updates_persist_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::new(path.clone()).unwrap();

        let mut buttons = store.buttons();
        buttons.success_duration_ms = 1200;
        store.update_buttons(buttons).unwrap();

        let mut recommendations = store.recommendations();
        recommendations.default_limit = 8;
        store.update_recommendations(recommendations).unwrap();

        let reopened = SettingsStore::new(path).unwrap();
        assert_eq!(reopened.buttons().success_duration_ms, 1200);
        assert_eq!(reopened.recommendations().default_limit, 8);
        reopened.reload().unwrap();
        assert_eq!(reopened.snapshot().recommendations.default_limit, 8);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.buttons().error_duration_ms, 5000);
        assert!(store.reload().is_err());
    }
}
