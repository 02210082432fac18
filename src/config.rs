//! # Configuration
//!
//! Two independent pieces of configuration:
//!
//! - [`TrackerConfig`]: how the tracker samples and where it keeps data. Built
//!   in code or from command-line flags; not persisted.
//! - [`Settings`]: user preferences for front ends, persisted as JSON in the
//!   user's config directory. The tracker itself never reads them.
//!
//! ## File Locations
//!
//! ```text
//! ~/.local/share/apptime/usage.json     usage data
//! ~/.config/apptime/settings.json       settings
//! ```
//!
//! The `directories` crate is used to resolve the platform-appropriate
//! directories.

use crate::probe::DEFAULT_PROBE_TIMEOUT;
use crate::usage::DEFAULT_RETENTION_DAYS;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

const APP_NAME: &str = "apptime";

/// Default time between samples
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Default time between periodic saves while tracking
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(60);

/// Sampling and storage parameters for a [`Tracker`](crate::tracker::Tracker).
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Time between samples
    pub tick_interval: Duration,
    /// Upper bound for one focus probe
    pub probe_timeout: Duration,
    /// Days of history kept on load and save
    pub retention_days: i64,
    /// Periodic flush while running; `None` saves only on stop
    pub autosave_interval: Option<Duration>,
    /// Location of the durable usage file
    pub data_file: PathBuf,
}

impl TrackerConfig {
    /// Default parameters with the usage file at `data_file`
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            retention_days: DEFAULT_RETENTION_DAYS,
            autosave_interval: Some(DEFAULT_AUTOSAVE_INTERVAL),
            data_file: data_file.into(),
        }
    }

    /// Default parameters with the usage file in the platform data directory
    pub fn with_default_paths() -> Result<Self> {
        Ok(Self::new(default_data_file()?))
    }
}

/// Persisted front-end preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Refresh the live summary while tracking
    #[serde(default = "default_true")]
    pub auto_refresh: bool,
    /// Prefer a dark colour scheme
    #[serde(default = "default_true")]
    pub dark_mode: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_refresh: true,
            dark_mode: true,
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults if the file is
    /// missing or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "could not load settings, using defaults");
                Self::default()
            }
        }
    }

    /// Load settings from a specific path. Returns `Settings::default()` if
    /// the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        let settings: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;
        Ok(settings)
    }

    /// Save the settings to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory: {}", parent.display())
            })?;
        }

        let contents =
            serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write settings file: {}", path.display()))?;

        Ok(())
    }
}

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
        .context("Could not determine application directories")
}

/// Platform default location of the usage file
pub fn default_data_file() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().join("usage.json"))
}

/// Platform default location of the settings file
pub fn default_settings_file() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("settings.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(settings.auto_refresh);
        assert!(settings.dark_mode);
    }

    #[test]
    fn test_deserialize_missing_fields_uses_defaults() {
        let settings: Settings = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(settings, Settings::default());

        let settings: Settings =
            serde_json::from_str(r#"{"dark_mode": false}"#).expect("deserialize");
        assert!(settings.auto_refresh);
        assert!(!settings.dark_mode);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let json = r#"{"auto_refresh": false, "dark_mode": true, "window": "800x600"}"#;
        let settings: Settings = serde_json::from_str(json).expect("deserialize");
        assert!(!settings.auto_refresh);
    }

    #[test]
    fn test_save_to_load_from_roundtrip() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let path = temp_dir.path().join("subdir").join("settings.json");

        let settings = Settings {
            auto_refresh: false,
            dark_mode: false,
        };
        settings.save_to(&path).expect("save_to");

        let loaded = Settings::load_from(&path).expect("load_from");
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_from_missing_file_returns_default() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let path = temp_dir.path().join("does_not_exist.json");

        let loaded = Settings::load_from(&path).expect("load_from");
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn test_corrupt_settings_fall_back_to_default() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, "{ nope").expect("write");

        assert!(Settings::load_from(&path).is_err());
        assert_eq!(Settings::load_or_default(&path), Settings::default());
    }

    #[test]
    fn test_tracker_config_defaults() {
        let config = TrackerConfig::new("/tmp/usage.json");
        assert_eq!(config.tick_interval, Duration::from_secs(1));
        assert_eq!(config.probe_timeout, Duration::from_secs(1));
        assert_eq!(config.retention_days, 7);
        assert_eq!(config.autosave_interval, Some(Duration::from_secs(60)));
        assert_eq!(config.data_file, PathBuf::from("/tmp/usage.json"));
    }
}
