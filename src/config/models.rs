//! Configuration data models
//!
//! This module defines the data structures used for client configuration.

use serde::{Deserialize, Serialize};

/// Default labeling service endpoint
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

/// Top-level client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Labeling service connection settings
    pub api: ApiSettings,
    /// User preferences
    pub preferences: UserPreferences,
}

/// Connection settings for the labeling service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL every endpoint path is appended to
    pub base_url: String,
    /// Per-request timeout in seconds (1-300)
    pub timeout_secs: u64,
}

/// User preferences and settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    /// Whether the CLI prints label ids next to label text
    pub show_label_ids: bool,
    /// Whether logs are written to a file in the data directory
    pub file_logging: bool,
}

impl ApiSettings {
    /// Timeout clamped to the supported range
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs.clamp(1, 300))
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            show_label_ids: true,
            file_logging: true,
        }
    }
}
