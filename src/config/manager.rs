//! Configuration manager for loading and saving client configuration
//!
//! This module provides functionality to load and save configuration to
//! `<data dir>/config.json` with atomic writes to prevent corruption.

use crate::config::models::AppConfig;
use crate::error::{Result, SnapLabelError, StringError};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the data directory
pub const HOME_ENV: &str = "SNAPLABEL_HOME";

/// Environment variable overriding the service base URL
pub const API_URL_ENV: &str = "SNAPLABEL_API_URL";

/// Configuration manager
pub struct ConfigManager;

impl ConfigManager {
    /// Get the SnapLabel data directory
    ///
    /// Returns `$SNAPLABEL_HOME` when set, otherwise `<config dir>/snaplabel`.
    pub fn data_dir() -> PathBuf {
        if let Some(home) = std::env::var_os(HOME_ENV) {
            return PathBuf::from(home);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("snaplabel")
    }

    /// Get the path to the configuration file
    pub fn get_config_path() -> PathBuf {
        Self::data_dir().join("config.json")
    }

    /// Ensure the data directory exists
    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir();
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Load the effective configuration
    ///
    /// Reads the stored configuration and applies the `SNAPLABEL_API_URL`
    /// override to the base URL. Never save the result; use
    /// [`ConfigManager::load_stored`] to edit settings.
    pub fn load() -> Result<AppConfig> {
        let mut config = Self::load_stored()?;

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                info!("Using API base URL from {}", API_URL_ENV);
                config.api.base_url = url.trim().to_string();
            }
        }

        Ok(config)
    }

    /// Load configuration from disk without environment overrides
    ///
    /// If the configuration file doesn't exist or is corrupt, returns default configuration.
    pub fn load_stored() -> Result<AppConfig> {
        let config_path = Self::get_config_path();

        if !config_path.exists() {
            info!("Configuration file not found, using defaults");
            return Ok(AppConfig::default());
        }

        let json = std::fs::read_to_string(&config_path)?;
        match serde_json::from_str(&json) {
            Ok(config) => {
                info!("Configuration loaded successfully");
                Ok(config)
            }
            Err(e) => {
                warn!("Failed to parse configuration, using defaults: {}", e);
                Ok(AppConfig::default())
            }
        }
    }

    /// Save configuration to disk with atomic write
    pub fn save(config: &AppConfig) -> Result<()> {
        let config_dir = Self::ensure_data_dir()?;
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&config_dir, &Self::get_config_path(), json.as_bytes())?;

        info!("Configuration saved successfully");
        Ok(())
    }
}

/// Write `contents` to `target` through a temporary file in `dir` and a rename
pub(crate) fn write_atomic(dir: &Path, target: &Path, contents: &[u8]) -> Result<()> {
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    temp.persist(target).map_err(|e| {
        SnapLabelError::ConfigError(StringError::new(format!(
            "Failed to replace {}: {}",
            target.display(),
            e.error
        )))
    })?;
    Ok(())
}
