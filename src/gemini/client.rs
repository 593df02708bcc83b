//! HTTP client for the Gemini Files and `generateContent` APIs.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};

use crate::config::AiConfig;
use crate::upload::{display_name, mime_type_for, FileState, UploadHandle};

use super::wire::{
    GenerateRequest, GenerateResponse, RemoteFile, StartUploadRequest, UploadMetadata,
    UploadResponse,
};
use super::{AiError, ContentGenerator, FileService, Part};

/// Connection timeout for HTTP requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Header carrying the resumable upload session URL.
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

/// Build an HTTP client with proper timeout and proxy configuration.
fn build_http_client(config: &AiConfig) -> Result<Client, AiError> {
    let mut builder = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(config.request_timeout());

    // Only the configured proxy is used; HTTP(S)_PROXY from the environment is ignored.
    builder = match &config.proxy {
        Some(proxy) => builder.proxy(
            reqwest::Proxy::all(proxy)
                .map_err(|e| AiError::RequestFailed(format!("Invalid proxy {proxy}: {e}")))?,
        ),
        None => builder.no_proxy(),
    };

    builder
        .build()
        .map_err(|e| AiError::RequestFailed(format!("Failed to build HTTP client: {e}")))
}

fn map_send_error(e: reqwest::Error) -> AiError {
    if e.is_timeout() {
        AiError::Timeout
    } else {
        AiError::RequestFailed(e.to_string())
    }
}

/// Pass successful responses through, turn the rest into `RequestFailed`.
async fn check_status(response: Response) -> Result<Response, AiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    Err(AiError::RequestFailed(format!("HTTP {status}: {text}")))
}

/// Gemini API client implementing both remote services.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_version: String,
    api_key: String,
}

impl GeminiClient {
    /// Create a client with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns `AiError::RequestFailed` if the HTTP client cannot be built,
    /// e.g. because the proxy URL is rejected.
    pub fn new(config: &AiConfig, api_key: String) -> Result<Self, AiError> {
        Ok(Self {
            client: build_http_client(config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.trim_matches('/').to_string(),
            api_key,
        })
    }

    /// Create client from configuration, reading the key from the environment.
    ///
    /// # Errors
    ///
    /// Returns `AiError::MissingApiKey` if the configured API key environment
    /// variable is not set or empty.
    pub fn from_config(config: &AiConfig) -> Result<Self, AiError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AiError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(config, api_key)
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.api_version, path)
    }

    fn upload_url(&self) -> String {
        format!("{}/upload/{}/files", self.base_url, self.api_version)
    }

    async fn fetch_file(&self, name: &str) -> Result<RemoteFile, AiError> {
        let response = self
            .client
            .get(self.api_url(name))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(map_send_error)?;

        check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| AiError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl FileService for GeminiClient {
    async fn upload(&self, path: &Path) -> Result<UploadHandle, AiError> {
        let bytes = tokio::fs::read(path).await?;
        let mime_type = mime_type_for(path);
        let display_name = display_name(path);

        tracing::debug!(file = %display_name, size = bytes.len(), mime_type, "Starting upload");

        // Resumable protocol: open a session, then send the bytes and finalize.
        let start = self
            .client
            .post(self.upload_url())
            .header("x-goog-api-key", &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", bytes.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&StartUploadRequest {
                file: UploadMetadata {
                    display_name: &display_name,
                },
            })
            .send()
            .await
            .map_err(map_send_error)?;
        let start = check_status(start).await?;

        let session_url = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .ok_or_else(|| AiError::ParseError("Upload session URL missing".to_string()))?;

        let finish = self
            .client
            .post(&session_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await
            .map_err(map_send_error)?;

        let uploaded: UploadResponse = check_status(finish)
            .await?
            .json()
            .await
            .map_err(|e| AiError::ParseError(e.to_string()))?;

        let file = uploaded.file;
        tracing::info!(file = %display_name, name = %file.name, state = %file.state, "Uploaded");

        Ok(UploadHandle {
            name: file.name,
            uri: file.uri,
            mime_type: file.mime_type.unwrap_or_else(|| mime_type.to_string()),
            source_path: path.to_path_buf(),
            state: file.state,
            expires_at: file.expiration_time,
        })
    }

    async fn get_status(&self, name: &str) -> Result<FileState, AiError> {
        Ok(self.fetch_file(name).await?.state)
    }

    async fn delete(&self, name: &str) -> Result<(), AiError> {
        let response = self
            .client
            .delete(self.api_url(name))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(map_send_error)?;
        check_status(response).await?;
        tracing::debug!(name, "Deleted remote file");
        Ok(())
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate(&self, model: &str, parts: &[Part]) -> Result<String, AiError> {
        let url = self.api_url(&format!("models/{model}:generateContent"));

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateRequest::from_parts(parts))
            .send()
            .await
            .map_err(map_send_error)?;

        let body: GenerateResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| AiError::ParseError(e.to_string()))?;

        body.text().map_err(AiError::ParseError)
    }
}
