//! Labeling service API
//!
//! This module defines the service operations the client consumes and the
//! wire formats they exchange.
//!
//! # Overview
//!
//! The service is an opaque HTTP API. Its operations are split by concern:
//! - [`LabelApi`]: label generation (multipart `POST /upload`) and final
//!   label submission (`POST /upload2`)
//! - [`AccountApi`]: login, registration and one-time-code confirmation
//!   under `/auth`
//! - [`SearchApi`]: free-text search over labeled images (`POST /search`)
//!
//! [`HttpGateway`] implements all three over `reqwest`. The traits exist so
//! the workflow controller and account flows can be driven by fakes in tests.
//!
//! # Authorization
//!
//! Authenticated calls carry the session token in the `auth-token` header.
//! A 401 response maps to [`SnapLabelError::Unauthorized`]; the caller decides
//! whether to clear the session.

pub mod http;

pub use http::HttpGateway;

use crate::error::{Result, SnapLabelError, StringError};
use crate::workflow::ImageFile;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Header carrying the session token
pub const AUTH_HEADER: &str = "auth-token";

/// Message the service returns on 401 when the account is unconfirmed
pub const UNCONFIRMED_ACCOUNT_MESSAGE: &str = "User account not confirmed";

/// Result of a label generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedLabels {
    /// Backend-assigned image identifier, required for submission
    pub image_id: String,
    /// AI labels in the order the service returned them
    pub labels: Vec<String>,
}

/// New account details
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    /// Display name ("first last")
    pub name: String,
    /// Account password
    pub password: String,
    /// Account email
    pub email: String,
}

/// Label generation and submission
#[async_trait]
pub trait LabelApi: Send + Sync {
    /// Upload `file` and receive AI labels plus the assigned image id
    async fn generate_labels(
        &self,
        file: &ImageFile,
        auth_token: Option<&str>,
    ) -> Result<GeneratedLabels>;

    /// Submit the final label texts for `image_id`
    async fn submit_labels(
        &self,
        image_id: &str,
        final_labels: &[String],
        auth_token: Option<&str>,
    ) -> Result<()>;
}

/// Account management
#[async_trait]
pub trait AccountApi: Send + Sync {
    /// Exchange credentials for an ID token
    ///
    /// Fails with [`SnapLabelError::AccountNotConfirmed`] when the account
    /// exists but its email has not been confirmed.
    async fn login(&self, email: &str, password: &str) -> Result<String>;

    /// Ask the service to email a fresh confirmation code
    async fn request_confirmation_code(&self, email: &str) -> Result<()>;

    /// Create an account
    ///
    /// Fails with [`SnapLabelError::AlreadyRegistered`] on HTTP 409.
    async fn register(&self, registration: &Registration) -> Result<()>;

    /// Confirm an account with the emailed one-time code
    async fn confirm(&self, email: &str, code: &str) -> Result<()>;
}

/// Image search
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// Search labeled images; returns image URLs
    async fn search(&self, query: &str, auth_token: Option<&str>) -> Result<Vec<String>>;
}

/// Body of `POST /upload2`
#[derive(Debug, Serialize)]
pub(crate) struct SubmitLabelsRequest<'a> {
    pub image_id: &'a str,
    pub final_labels: &'a [String],
}

/// Body of `POST /search`
#[derive(Debug, Serialize)]
pub(crate) struct SearchRequest<'a> {
    pub query: &'a str,
    pub custom_label: &'a str,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    image_id: Option<serde_json::Value>,
    #[serde(default)]
    labels: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    data: LoginData,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    #[serde(rename = "AuthenticationResult")]
    authentication_result: AuthenticationResult,
}

#[derive(Debug, Deserialize)]
struct AuthenticationResult {
    #[serde(rename = "IdToken")]
    id_token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Parse the body of a successful `POST /upload`
///
/// A missing or null `labels` field means no AI labels. The image id may be a
/// string or a number; anything else is a malformed response.
pub fn parse_upload_response(body: &str) -> Result<GeneratedLabels> {
    let response: UploadResponse =
        serde_json::from_str(body).map_err(|e| SnapLabelError::MalformedResponse(Box::new(e)))?;

    let image_id = match response.image_id {
        Some(serde_json::Value::String(id)) if !id.is_empty() => id,
        Some(serde_json::Value::Number(id)) => id.to_string(),
        _ => {
            return Err(SnapLabelError::MalformedResponse(StringError::new(
                "upload response has no image_id",
            )));
        }
    };

    Ok(GeneratedLabels {
        image_id,
        labels: response.labels.unwrap_or_default(),
    })
}

/// Parse the body of a successful `POST /auth/login` into the ID token
pub fn parse_login_response(body: &str) -> Result<String> {
    let response: LoginResponse =
        serde_json::from_str(body).map_err(|e| SnapLabelError::MalformedResponse(Box::new(e)))?;
    Ok(response.data.authentication_result.id_token)
}

/// Parse the body of a successful `POST /search`
pub fn parse_search_response(body: &str) -> Result<Vec<String>> {
    serde_json::from_str(body).map_err(|e| SnapLabelError::MalformedResponse(Box::new(e)))
}

/// Extract the `message` field of an error body, falling back to the raw text
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| body.trim().to_string())
}
