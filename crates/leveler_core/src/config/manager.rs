//! Config manager for loading and saving settings.
//!
//! Saves are atomic: the serialized document is written to a temp sibling
//! and renamed over the config file, so a crash mid-save never leaves a
//! truncated config behind.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::settings::Settings;

/// Errors that can occur during config operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Manages loading and saving the application configuration.
pub struct ConfigManager {
    /// Path to the config file.
    config_path: PathBuf,
    /// Current settings loaded in memory.
    settings: Settings,
}

impl ConfigManager {
    /// Create a new config manager with the given config file path.
    ///
    /// Does not load the config - call `load()` or `load_or_create()` after.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Settings::default(),
        }
    }

    /// Get the config file path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Get a reference to the current settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get a mutable reference to the current settings.
    ///
    /// Changes are only in memory until `save()` is called.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Load config from file.
    ///
    /// Returns an error if the file doesn't exist.
    pub fn load(&mut self) -> ConfigResult<()> {
        if !self.config_path.exists() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }

        let content = fs::read_to_string(&self.config_path)?;
        self.settings = toml::from_str(&content)?;
        Ok(())
    }

    /// Load config from file, creating it with defaults if it doesn't exist.
    pub fn load_or_create(&mut self) -> ConfigResult<()> {
        if self.config_path.exists() {
            self.load()
        } else {
            if let Some(parent) = self.config_path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            self.settings = Settings::default();
            self.save()
        }
    }

    /// Save current settings to the config file atomically.
    pub fn save(&self) -> ConfigResult<()> {
        let content = toml::to_string_pretty(&self.settings)?;

        let mut tmp_name = self
            .config_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        tmp_name.push(".tmp");
        let tmp_path = self.config_path.with_file_name(tmp_name);

        fs::write(&tmp_path, content)?;
        if let Err(e) = fs::rename(&tmp_path, &self.config_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(ConfigError::ReadError(e));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_missing_file_errors() {
        let dir = TempDir::new().unwrap();
        let mut mgr = ConfigManager::new(dir.path().join("leveler.toml"));
        assert!(matches!(mgr.load(), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn load_or_create_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("leveler.toml");
        let mut mgr = ConfigManager::new(&path);
        mgr.load_or_create().unwrap();

        assert!(path.exists());
        assert_eq!(mgr.settings().targets.integrated_lufs, -24.0);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("leveler.toml");

        let mut mgr = ConfigManager::new(&path);
        mgr.load_or_create().unwrap();
        mgr.settings_mut().targets.tolerance_lu = 1.0;
        mgr.save().unwrap();

        let mut reloaded = ConfigManager::new(&path);
        reloaded.load().unwrap();
        assert_eq!(reloaded.settings().targets.tolerance_lu, 1.0);
    }

    #[test]
    fn save_leaves_no_temp_sibling() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("leveler.toml");
        let mut mgr = ConfigManager::new(&path);
        mgr.load_or_create().unwrap();

        assert!(!dir.path().join("leveler.toml.tmp").exists());
    }

    #[test]
    fn load_rejects_malformed_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("leveler.toml");
        fs::write(&path, "[targets\nbroken").unwrap();

        let mut mgr = ConfigManager::new(&path);
        assert!(matches!(mgr.load(), Err(ConfigError::ParseError(_))));
    }
}
