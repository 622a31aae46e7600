//! Shared test utilities for `SnapLabel` unit tests.
//!
//! This module provides common test infrastructure used across multiple test modules.
//! It is only compiled during testing (`#[cfg(test)]`).

use crate::config::manager::{API_URL_ENV, HOME_ENV};
use std::sync::Mutex;
use tempfile::TempDir;

/// Global mutex to serialize tests that modify the SnapLabel environment variables.
/// This prevents race conditions when multiple tests run in parallel and try to
/// point the data directory at different places.
static HOME_LOCK: Mutex<()> = Mutex::new(());

/// Helper function to create a temporary test directory using tempfile.
/// Returns a `TempDir` that automatically cleans up when dropped.
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// RAII guard that points `SNAPLABEL_HOME` at a temp directory for a test scope,
/// clears `SNAPLABEL_API_URL`, and restores both when dropped.
///
/// # Safety Considerations
///
/// `std::env::set_var` and `std::env::remove_var` are unsafe because they race
/// with concurrent readers. The `HOME_LOCK` mutex serializes every test that
/// touches these variables, and the guard restores the original values on drop
/// (including on panic).
pub struct HomeGuard {
    original_home: Option<String>,
    original_url: Option<String>,
    // Lock guard must be held for the lifetime of this struct
    _lock: std::sync::MutexGuard<'static, ()>,
}

#[expect(
    unsafe_code,
    reason = "Test-only code that modifies environment variables under a global lock"
)]
impl HomeGuard {
    /// Create a guard with the data directory set to `temp_dir`.
    pub fn new(temp_dir: &TempDir) -> Self {
        Self::install(temp_dir, None)
    }

    /// Create a guard that additionally sets `SNAPLABEL_API_URL`.
    pub fn with_api_url(temp_dir: &TempDir, url: &str) -> Self {
        Self::install(temp_dir, Some(url))
    }

    fn install(temp_dir: &TempDir, url: Option<&str>) -> Self {
        // A panicking test poisons the lock; the guarded data is `()` so recover it
        let lock = HOME_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let original_home = std::env::var(HOME_ENV).ok();
        let original_url = std::env::var(API_URL_ENV).ok();
        // SAFETY: HOME_LOCK is held, so no other guarded test reads or writes these
        // variables concurrently.
        unsafe {
            std::env::set_var(HOME_ENV, temp_dir.path());
            match url {
                Some(url) => std::env::set_var(API_URL_ENV, url),
                None => std::env::remove_var(API_URL_ENV),
            }
        }
        Self {
            original_home,
            original_url,
            _lock: lock,
        }
    }
}

#[expect(
    unsafe_code,
    reason = "Test-only code that restores environment variables under a global lock"
)]
impl Drop for HomeGuard {
    fn drop(&mut self) {
        // SAFETY: the lock is still held until this struct's fields drop.
        unsafe {
            match &self.original_home {
                Some(original) => std::env::set_var(HOME_ENV, original),
                None => std::env::remove_var(HOME_ENV),
            }
            match &self.original_url {
                Some(original) => std::env::set_var(API_URL_ENV, original),
                None => std::env::remove_var(API_URL_ENV),
            }
        }
    }
}

