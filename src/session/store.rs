//! Session store implementations

use crate::config::manager::write_atomic;
use crate::error::{Result, SnapLabelError, StringError};
use crate::session::SessionStore;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Session store kept only in memory
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: RwLock<Option<String>>,
}

impl MemorySessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `token`
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get_token(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn set_token(&self, token: &str) -> Result<()> {
        *self.token.write() = Some(token.to_string());
        Ok(())
    }

    fn clear_token(&self) -> Result<()> {
        *self.token.write() = None;
        Ok(())
    }
}

/// On-disk session file contents
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    id_token: Option<String>,
}

/// Session store persisted to a JSON file
///
/// The token is cached in memory and the file is rewritten atomically on every
/// change, so a crash never leaves a half-written session behind.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    token: RwLock<Option<String>>,
}

impl FileSessionStore {
    /// File name used inside the data directory
    pub const FILE_NAME: &'static str = "session.json";

    /// Open the session file at `path`
    ///
    /// A missing file means logged out. A corrupt file is logged and treated
    /// as logged out.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let token = if path.exists() {
            let json = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<SessionFile>(&json) {
                Ok(file) => file.id_token,
                Err(e) => {
                    warn!("Ignoring corrupt session file {}: {}", path.display(), e);
                    None
                }
            }
        } else {
            None
        };
        debug!(
            "Opened session file {} (logged in: {})",
            path.display(),
            token.is_some()
        );

        Ok(Self {
            path,
            token: RwLock::new(token),
        })
    }

    /// Open `session.json` inside `dir`
    pub fn in_dir(dir: &Path) -> Result<Self> {
        Self::open(dir.join(Self::FILE_NAME))
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, token: Option<&str>) -> Result<()> {
        let dir = self.path.parent().ok_or_else(|| {
            SnapLabelError::ConfigError(StringError::new("Invalid session file path"))
        })?;
        std::fs::create_dir_all(dir)?;
        let json = serde_json::to_string_pretty(&SessionFile {
            id_token: token.map(str::to_string),
        })?;
        write_atomic(dir, &self.path, json.as_bytes())
    }
}

impl SessionStore for FileSessionStore {
    fn get_token(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn set_token(&self, token: &str) -> Result<()> {
        let mut guard = self.token.write();
        self.persist(Some(token))?;
        *guard = Some(token.to_string());
        info!("Session token stored");
        Ok(())
    }

    fn clear_token(&self) -> Result<()> {
        let mut guard = self.token.write();
        self.persist(None)?;
        *guard = None;
        info!("Session token cleared");
        Ok(())
    }
}
