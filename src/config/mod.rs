//! Configuration management module
//!
//! This module handles loading, saving, and managing client configuration.
//! Configuration is stored as `config.json` in the SnapLabel data directory
//! with atomic writes to prevent corruption.

pub mod manager;
pub mod models;

pub use manager::ConfigManager;
pub use models::{ApiSettings, AppConfig, UserPreferences};
