use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::metrics::DerivationConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserSettings {
    #[serde(default)]
    derivation: DerivationConfig,
}

/// File-backed derivation settings.
///
/// A missing file means defaults. A file that exists but does not parse is an
/// error, since silently falling back would change derived values.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            let settings: UserSettings = serde_json::from_str(&contents)
                .with_context(|| format!("Invalid settings in {}", path.display()))?;
            settings
                .derivation
                .validate()
                .with_context(|| format!("Invalid derivation settings in {}", path.display()))?;
            settings
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn derivation(&self) -> Result<DerivationConfig> {
        let guard = self
            .data
            .read()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        Ok(guard.derivation.clone())
    }

    pub fn update_derivation(&self, config: DerivationConfig) -> Result<()> {
        config.validate()?;
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        guard.derivation = config;
        self.persist(&guard)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create settings directory {}", parent.display())
                })?;
            }
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        assert_eq!(store.derivation().unwrap(), DerivationConfig::default());
    }

    #[test]
    fn update_round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let store = SettingsStore::new(path.clone()).unwrap();
        let mut config = DerivationConfig::default();
        config.time_tolerance_secs = 0.1;
        config.precision.velocity_decimals = 4;
        store.update_derivation(config.clone()).unwrap();

        let reopened = SettingsStore::new(path).unwrap();
        assert_eq!(reopened.derivation().unwrap(), config);
    }

    #[test]
    fn out_of_bounds_precision_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"derivation":{"precision":{"ratioDecimals":400}}}"#).unwrap();
        let err = SettingsStore::new(path.clone()).err().unwrap();
        assert!(format!("{err:#}").contains("ratioDecimals"));

        let store = SettingsStore::new(dir.path().join("other.json")).unwrap();
        let mut config = DerivationConfig::default();
        config.precision.velocity_decimals = 16;
        assert!(store.update_derivation(config).is_err());
        assert_eq!(store.derivation().unwrap(), DerivationConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(SettingsStore::new(path).is_err());
    }
}
