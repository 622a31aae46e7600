//! `reqwest` implementation of the service API

use crate::api::{
    AUTH_HEADER, AccountApi, GeneratedLabels, LabelApi, Registration, SearchApi, SearchRequest,
    SubmitLabelsRequest, UNCONFIRMED_ACCOUNT_MESSAGE, error_message, parse_login_response,
    parse_search_response, parse_upload_response,
};
use crate::config::ApiSettings;
use crate::error::{Result, SnapLabelError};
use crate::workflow::ImageFile;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::json;
use tracing::{debug, info, warn};

/// Longest error body kept in [`SnapLabelError::UnexpectedStatus`]
const MAX_ERROR_BODY: usize = 512;

/// HTTP client for the labeling service
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    /// Create a gateway from connection settings
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .user_agent(format!("SnapLabel/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                warn!("Failed to create HTTP client: {}", e);
                // Preserve error chain by wrapping the source error
                SnapLabelError::ConfigError(Box::new(e))
            })?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn post(&self, path: &str, auth_token: Option<&str>) -> RequestBuilder {
        let url = self.url(path);
        debug!("POST {}", url);
        let request = self.client.post(url);
        match auth_token {
            Some(token) => request.header(AUTH_HEADER, token),
            None => request,
        }
    }
}

/// Read a response body, mapping 401 and other non-success statuses to errors
async fn success_body(response: Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return Ok(body);
    }

    warn!("Service returned {}", status);
    if status == StatusCode::UNAUTHORIZED {
        return Err(SnapLabelError::Unauthorized(error_message(&body)));
    }
    Err(unexpected_status(status, body))
}

fn unexpected_status(status: StatusCode, mut body: String) -> SnapLabelError {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    SnapLabelError::UnexpectedStatus {
        status: status.as_u16(),
        body,
    }
}

#[async_trait]
impl LabelApi for HttpGateway {
    async fn generate_labels(
        &self,
        file: &ImageFile,
        auth_token: Option<&str>,
    ) -> Result<GeneratedLabels> {
        info!(
            "Requesting labels for {} ({} bytes)",
            file.name(),
            file.len()
        );

        let part = Part::bytes(file.bytes().to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.content_type())?;
        let form = Form::new()
            .part("imagef", part)
            .text("filename", file.name().to_string());

        let response = self
            .post("upload", auth_token)
            .multipart(form)
            .send()
            .await?;
        let body = success_body(response).await?;
        let generated = parse_upload_response(&body)?;

        info!(
            "Received {} labels for image {}",
            generated.labels.len(),
            generated.image_id
        );
        Ok(generated)
    }

    async fn submit_labels(
        &self,
        image_id: &str,
        final_labels: &[String],
        auth_token: Option<&str>,
    ) -> Result<()> {
        info!(
            "Submitting {} labels for image {}",
            final_labels.len(),
            image_id
        );

        let response = self
            .post("upload2", auth_token)
            .json(&SubmitLabelsRequest {
                image_id,
                final_labels,
            })
            .send()
            .await?;
        success_body(response).await?;

        info!("Labels submitted for image {}", image_id);
        Ok(())
    }
}

#[async_trait]
impl AccountApi for HttpGateway {
    async fn login(&self, email: &str, password: &str) -> Result<String> {
        info!("Logging in as {}", email);

        let response = self
            .post("auth/login", None)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            let message = error_message(&response.text().await?);
            if message == UNCONFIRMED_ACCOUNT_MESSAGE {
                info!("Account {} is not confirmed", email);
                return Err(SnapLabelError::AccountNotConfirmed);
            }
            return Err(SnapLabelError::Unauthorized(message));
        }

        let body = success_body(response).await?;
        parse_login_response(&body)
    }

    async fn request_confirmation_code(&self, email: &str) -> Result<()> {
        info!("Requesting confirmation code for {}", email);

        let response = self
            .post("auth/request_confirm_code", None)
            .json(&json!({ "email": email }))
            .send()
            .await?;
        success_body(response).await?;
        Ok(())
    }

    async fn register(&self, registration: &Registration) -> Result<()> {
        info!("Registering {}", registration.email);

        let response = self
            .post("auth/register", None)
            .json(registration)
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            info!("{} is already registered", registration.email);
            return Err(SnapLabelError::AlreadyRegistered);
        }
        success_body(response).await?;
        Ok(())
    }

    async fn confirm(&self, email: &str, code: &str) -> Result<()> {
        info!("Confirming account {}", email);

        let response = self
            .post("auth/confirm", None)
            .json(&json!({ "email": email, "confirmation_code": code }))
            .send()
            .await?;
        success_body(response).await?;
        Ok(())
    }
}

#[async_trait]
impl SearchApi for HttpGateway {
    async fn search(&self, query: &str, auth_token: Option<&str>) -> Result<Vec<String>> {
        info!("Searching for '{}'", query);

        let response = self
            .post("search", auth_token)
            .json(&SearchRequest {
                query,
                custom_label: "",
            })
            .send()
            .await?;
        let body = success_body(response).await?;
        let urls = parse_search_response(&body)?;

        debug!("Search returned {} images", urls.len());
        Ok(urls)
    }
}
