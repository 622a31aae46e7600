//! Logging system initialization
//!
//! Sets up tracing-based logging. With file logging enabled, output goes to
//! `snaplabel.log` in the data directory and the previous logs are rotated on
//! startup, keeping 9 historical files. Otherwise warnings and errors go to
//! stderr so they do not interleave with command output.

use crate::error::{Result, SnapLabelError, StringError};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt};

/// Maximum number of historical log files to keep (snaplabel.log.1 through snaplabel.log.9)
const MAX_LOG_FILES: u8 = 9;

/// Log file name inside the data directory
const LOG_FILE_NAME: &str = "snaplabel.log";

/// Initialize the logging system
///
/// `log_dir` selects file output; `None` logs to stderr. The level defaults to
/// INFO for files and WARN for stderr (DEBUG for both when `verbose`), and can
/// always be overridden through the `RUST_LOG` environment variable.
pub fn init_logging(log_dir: Option<&Path>, verbose: bool) -> Result<()> {
    let default_level = match (log_dir.is_some(), verbose) {
        (_, true) => "snaplabel=debug,info",
        (true, false) => "info",
        (false, false) => "warn",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match log_dir {
        Some(log_dir) => {
            std::fs::create_dir_all(log_dir)?;

            // Rotate existing log files on startup
            let log_path = log_dir.join(LOG_FILE_NAME);
            rotate_logs_on_startup(&log_path)?;

            // tracing_appender's RollingFileAppender doesn't support startup-based
            // rotation with this retention policy, so rotation is handled above
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix("snaplabel")
                .filename_suffix("log")
                .build(log_dir)
                .map_err(|e| SnapLabelError::ConfigError(Box::new(e)))?;

            let subscriber = fmt()
                .with_writer(file_appender)
                .with_env_filter(filter)
                .with_ansi(false) // Disable ANSI colors for file output
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .finish();

            tracing::subscriber::set_global_default(subscriber)
                .map_err(|e| SnapLabelError::ConfigError(Box::new(e)))?;
        }
        None => {
            let subscriber = fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .with_target(false)
                .finish();

            tracing::subscriber::set_global_default(subscriber)
                .map_err(|e| SnapLabelError::ConfigError(Box::new(e)))?;
        }
    }

    tracing::info!("SnapLabel v{} started", env!("CARGO_PKG_VERSION"));

    Ok(())
}

/// Rotate log files on startup
///
/// Keeps the logs of the last 10 sessions:
/// - snaplabel.log.9 is deleted (oldest log)
/// - snaplabel.log.8 -> snaplabel.log.9, ..., snaplabel.log.1 -> snaplabel.log.2
/// - snaplabel.log -> snaplabel.log.1
/// - A fresh snaplabel.log will be created by the logger
fn rotate_logs_on_startup(log_path: &Path) -> Result<()> {
    // If the current log doesn't exist, nothing to rotate
    if !log_path.exists() {
        return Ok(());
    }

    let log_dir = log_path
        .parent()
        .ok_or_else(|| SnapLabelError::ConfigError(StringError::new("Invalid log path")))?;

    let log_name = log_path
        .file_name()
        .ok_or_else(|| SnapLabelError::ConfigError(StringError::new("Invalid log filename")))?
        .to_string_lossy();

    // Delete the oldest log file if it exists
    let oldest_log = log_dir.join(format!("{log_name}.{MAX_LOG_FILES}"));
    if oldest_log.exists() {
        std::fs::remove_file(&oldest_log)?;
    }

    for i in (1..MAX_LOG_FILES).rev() {
        let current_log = log_dir.join(format!("{log_name}.{i}"));
        let next_log = log_dir.join(format!("{log_name}.{}", i + 1));

        if current_log.exists() {
            std::fs::rename(&current_log, &next_log)?;
        }
    }

    let log_1 = log_dir.join(format!("{log_name}.1"));
    std::fs::rename(log_path, &log_1)?;

    Ok(())
}
