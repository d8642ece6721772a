//! Engine settings and their JSON persistence.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::core::time::Clock;
use crate::errors::{EnvelopeError, Result};
use crate::ledger::{Interval, ViewWindow};

const SETTINGS_DIR: &str = "envelope_core";
const SETTINGS_FILE: &str = "settings.json";
const TMP_SUFFIX: &str = "tmp";

/// Tunables shared by every aggregation run of a host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineSettings {
    #[serde(default)]
    pub default_interval: Interval,
    /// Finite magnitude a host uses to mark unlimited capacities. Infinite
    /// amounts are always treated as unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlimited_sentinel: Option<f64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_interval: Interval::Month,
            unlimited_sentinel: None,
        }
    }
}

impl EngineSettings {
    /// Window over the current bucket at the configured granularity.
    pub fn current_window(&self, clock: &impl Clock) -> ViewWindow {
        ViewWindow::current(self.default_interval, clock)
    }

    fn validate(&self) -> Result<()> {
        match self.unlimited_sentinel {
            Some(value) if !value.is_finite() || value <= 0.0 => Err(EnvelopeError::Config(
                format!("unlimited_sentinel must be a positive finite number, got {value}"),
            )),
            _ => Ok(()),
        }
    }
}

/// Loads and stores [`EngineSettings`] as pretty JSON.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Manager rooted in the platform configuration directory.
    pub fn from_default_location() -> Result<Self> {
        let base = dirs::config_dir().ok_or_else(|| {
            EnvelopeError::Config("no configuration directory on this platform".into())
        })?;
        Ok(Self::new(base.join(SETTINGS_DIR).join(SETTINGS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads settings, falling back to defaults when the file does not exist.
    pub fn load(&self) -> Result<EngineSettings> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "settings file missing, using defaults");
            return Ok(EngineSettings::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let settings: EngineSettings = serde_json::from_str(&data)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Like [`ConfigManager::load`], but logs and falls back on any failure.
    pub fn load_or_default(&self) -> EngineSettings {
        self.load().unwrap_or_else(|err| {
            tracing::warn!(path = %self.path.display(), error = %err, "ignoring unreadable settings");
            EngineSettings::default()
        })
    }

    pub fn save(&self, settings: &EngineSettings) -> Result<()> {
        settings.validate()?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let manager = ConfigManager::new(dir.path().join("settings.json"));
        assert_eq!(manager.load().unwrap(), EngineSettings::default());
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let dir = TempDir::new().expect("tempdir");
        let manager = ConfigManager::new(dir.path().join("nested").join("settings.json"));
        let settings = EngineSettings {
            default_interval: Interval::Year,
            unlimited_sentinel: Some(9_999_999.0),
        };
        manager.save(&settings).expect("save settings");
        assert!(!tmp_path(manager.path()).exists());
        assert_eq!(manager.load().unwrap(), settings);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"default_interval":"year"}"#).unwrap();
        let settings = ConfigManager::new(path).load().unwrap();
        assert_eq!(settings.default_interval, Interval::Year);
        assert_eq!(settings.unlimited_sentinel, None);
    }

    #[test]
    fn rejects_invalid_interval_and_sentinel() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("settings.json");

        fs::write(&path, r#"{"default_interval":"week"}"#).unwrap();
        let manager = ConfigManager::new(path.clone());
        assert!(matches!(manager.load(), Err(EnvelopeError::Serde(_))));
        assert_eq!(manager.load_or_default(), EngineSettings::default());

        fs::write(&path, r#"{"unlimited_sentinel":-5.0}"#).unwrap();
        assert!(matches!(manager.load(), Err(EnvelopeError::Config(_))));
    }
}
