//! Error types for `SnapLabel`
//!
//! This module defines all error types used throughout the client,
//! providing clear error messages and proper error propagation.
//!
//! Error variants use `#[source]` to preserve error chains so the binary can
//! print the full cause with `{:#}`.

use thiserror::Error;

/// Simple error type for wrapping string messages while implementing `std::error::Error`
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StringError(pub String);

impl StringError {
    /// Create a new `StringError` from a string message
    pub fn new(msg: impl Into<String>) -> Box<Self> {
        Box::new(Self(msg.into()))
    }
}

/// Coarse classification of a failure
///
/// The workflow controller records this on its `Failed` phase so that
/// collaborators can react without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input rejected locally, or refused by the service as a conflict
    Validation,
    /// The service rejected the session token (HTTP 401)
    Auth,
    /// Transport failure, unexpected status or malformed response
    Network,
    /// Operation not permitted in the current workflow phase
    State,
    /// Local filesystem, configuration or serialization failure
    Local,
}

/// Main error type for `SnapLabel`
#[derive(Debug, Error)]
pub enum SnapLabelError {
    /// No file has been selected for upload
    #[error("No file selected")]
    NoFileSelected,

    /// The selected file is empty
    #[error("File is empty: {0}")]
    EmptyFile(String),

    /// The selected file is not one of the accepted image types
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Email address failed local validation
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// Password does not meet the strength rules
    #[error("Password does not meet requirements")]
    WeakPassword,

    /// Password and confirmation differ
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// One-time confirmation code is not six digits
    #[error("Invalid confirmation code")]
    InvalidConfirmationCode,

    /// The service rejected the session token or credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Login refused because the account has not been confirmed yet
    #[error("User account not confirmed")]
    AccountNotConfirmed,

    /// Registration refused because the account already exists
    #[error("Account already registered")]
    AlreadyRegistered,

    /// HTTP request could not be completed
    /// Preserves the underlying error source for full error chain transparency
    #[error("Request failed: {0}")]
    RequestFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The service answered with a non-success status other than 401
    #[error("Service returned status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// Response body could not be interpreted
    /// Preserves the underlying error source for full error chain transparency
    #[error("Malformed response: {0}")]
    MalformedResponse(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Operation is not allowed in the current workflow phase
    #[error("Cannot {operation} while {phase}")]
    InvalidPhase {
        /// Operation that was attempted
        operation: &'static str,
        /// Phase the workflow was in
        phase: String,
    },

    /// A generation or submission request is already outstanding
    #[error("A request is already in flight")]
    RequestInFlight,

    /// Submission attempted without a backend-assigned image id
    #[error("No image id assigned; generate labels first")]
    MissingImageId,

    /// Configuration error
    /// Preserves the underlying error source for full error chain transparency
    #[error("Configuration error: {0}")]
    ConfigError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl SnapLabelError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoFileSelected
            | Self::EmptyFile(_)
            | Self::UnsupportedFileType(_)
            | Self::InvalidEmail(_)
            | Self::WeakPassword
            | Self::PasswordMismatch
            | Self::InvalidConfirmationCode
            | Self::AlreadyRegistered => ErrorKind::Validation,
            Self::Unauthorized(_) | Self::AccountNotConfirmed => ErrorKind::Auth,
            Self::RequestFailed(_)
            | Self::UnexpectedStatus { .. }
            | Self::MalformedResponse(_) => ErrorKind::Network,
            Self::InvalidPhase { .. } | Self::RequestInFlight | Self::MissingImageId => {
                ErrorKind::State
            }
            Self::ConfigError(_) | Self::IoError(_) | Self::JsonError(_) => ErrorKind::Local,
        }
    }
}

impl From<reqwest::Error> for SnapLabelError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::MalformedResponse(Box::new(e))
        } else {
            Self::RequestFailed(Box::new(e))
        }
    }
}

/// Result type alias for `SnapLabel` operations
pub type Result<T> = std::result::Result<T, SnapLabelError>;

/// Convert an error to a user-friendly message
///
/// This function takes a `SnapLabelError` and returns a message suitable
/// for showing to end users as a notification.
pub fn get_user_friendly_error(error: &SnapLabelError) -> String {
    match error {
        SnapLabelError::NoFileSelected => "No file uploaded.".to_string(),
        SnapLabelError::EmptyFile(name) => {
            format!("The file {name} is empty. Please choose another image.")
        }
        SnapLabelError::UnsupportedFileType(_) => {
            "Please select a jpeg, jpg, or png file.".to_string()
        }
        SnapLabelError::InvalidEmail(_) => "Invalid email address".to_string(),
        SnapLabelError::WeakPassword => "Password must be at least 8 characters long and include \
             one uppercase letter, one lowercase letter, one number, and one special character"
            .to_string(),
        SnapLabelError::PasswordMismatch => "Passwords do not match".to_string(),
        SnapLabelError::InvalidConfirmationCode => {
            "Invalid OTP. Please enter a 6-digit OTP.".to_string()
        }
        SnapLabelError::Unauthorized(_) => {
            "Your session has expired or is invalid. Please log in again.".to_string()
        }
        SnapLabelError::AccountNotConfirmed => {
            "Your account is not confirmed yet. Check your email for a confirmation code."
                .to_string()
        }
        SnapLabelError::AlreadyRegistered => "Already registered, please login.".to_string(),
        SnapLabelError::RequestFailed(_)
        | SnapLabelError::UnexpectedStatus { .. }
        | SnapLabelError::MalformedResponse(_) => {
            "An error occurred while contacting the labeling service.\n\n\
             Please check your connection and try again."
                .to_string()
        }
        SnapLabelError::InvalidPhase { operation, phase } => {
            format!("Cannot {operation} right now (workflow is {phase}).")
        }
        SnapLabelError::RequestInFlight => {
            "Please wait for the current request to finish.".to_string()
        }
        SnapLabelError::MissingImageId => "Generate labels before uploading.".to_string(),
        SnapLabelError::ConfigError(_) => "Failed to load or save configuration.\n\n\
             Your settings may not persist.\n\
             Check that you have write permissions to the SnapLabel data directory."
            .to_string(),
        SnapLabelError::IoError(e) => {
            format!(
                "A file system error occurred:\n\n{e}\n\n\
                 Please check file permissions and disk space."
            )
        }
        SnapLabelError::JsonError(e) => {
            format!(
                "A stored file is corrupted:\n\n{e}\n\n\
                 The application will use default settings."
            )
        }
    }
}
