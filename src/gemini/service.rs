//! Service traits for the remote file store and the generation endpoint.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::upload::{FileState, UploadHandle};

/// Errors from remote AI service calls.
#[derive(Error, Debug)]
pub enum AiError {
    #[error("API key not configured (env: {0})")]
    MissingApiKey(String),
    #[error("API request failed: {0}")]
    RequestFailed(String),
    #[error("Failed to parse response: {0}")]
    ParseError(String),
    #[error("AI request timed out")]
    Timeout,
    #[error("Failed to read upload body: {0}")]
    Io(#[from] std::io::Error),
}

/// One element of a generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    /// Literal prompt text.
    Text(String),
    /// A previously uploaded document, inlined by the service.
    Document(UploadHandle),
}

impl Part {
    /// Build a text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Text content, if this is a text part.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Document(_) => None,
        }
    }

    /// Document handle, if this is a document part.
    #[must_use]
    pub fn as_document(&self) -> Option<&UploadHandle> {
        match self {
            Self::Document(handle) => Some(handle),
            Self::Text(_) => None,
        }
    }
}

/// Remote document store.
#[async_trait]
pub trait FileService: Send + Sync {
    /// Register a local file with the service.
    async fn upload(&self, path: &Path) -> Result<UploadHandle, AiError>;

    /// Current processing state of an uploaded document.
    async fn get_status(&self, name: &str) -> Result<FileState, AiError>;

    /// Remove an uploaded document.
    async fn delete(&self, name: &str) -> Result<(), AiError>;
}

/// Remote content generation endpoint.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generate a text response for an ordered list of parts.
    async fn generate(&self, model: &str, parts: &[Part]) -> Result<String, AiError>;
}
