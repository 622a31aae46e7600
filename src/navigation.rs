//! Navigation targets and user notices
//!
//! Controllers never render anything. They emit a [`View`] to move to and
//! [`Notice`]s to show, and the front end decides how to present them.

use std::fmt;

/// Screens of the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// Email and password login
    Login,
    /// Account registration
    Register,
    /// One-time confirmation code entry for `email`
    EnterConfirmationCode {
        /// Account being confirmed
        email: String,
    },
    /// Image search
    Search,
    /// Image upload and labeling
    Upload,
}

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Operation completed
    Success,
    /// Operation failed
    Error,
}

/// A short message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Display text
    pub message: String,
}

impl Notice {
    /// Success notice
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    /// Error notice
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
