//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::upload::PollPolicy;

use super::ConfigError;

/// Configuration for the Gemini client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Model used for analysis.
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL for the API, without version.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API version path segment.
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Environment variable name for the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Overall timeout for a single HTTP request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Proxy for all outgoing requests, e.g. `http://127.0.0.1:7890`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_api_version() -> String {
    "v1beta".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_request_timeout_secs() -> u64 {
    300
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            api_version: default_api_version(),
            api_key_env: default_api_key_env(),
            request_timeout_secs: default_request_timeout_secs(),
            proxy: None,
        }
    }
}

impl AiConfig {
    /// Request timeout as a duration.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Where the knowledge base lives and which files it consists of.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeBaseConfig {
    /// Folder scanned (non-recursively) for notes and papers.
    pub folder: PathBuf,
    /// Extensions read locally as UTF-8 text.
    pub text_extensions: Vec<String>,
    /// Extensions uploaded to the file service.
    pub document_extensions: Vec<String>,
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("./my_knowledge_base"),
            text_extensions: vec!["md".to_string(), "txt".to_string()],
            document_extensions: vec!["pdf".to_string()],
        }
    }
}

/// Upload polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Seconds between status queries.
    pub interval_secs: u64,
    /// Seconds to wait for a single document; `0` waits forever.
    pub timeout_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: 2,
            timeout_secs: 300,
        }
    }
}

impl PollingConfig {
    /// Polling policy described by this configuration.
    #[must_use]
    pub fn policy(&self) -> PollPolicy {
        let timeout = (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs));
        PollPolicy::new(Duration::from_secs(self.interval_secs), timeout)
    }
}

/// Top-level configuration for a research run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Delete uploaded documents from the service once the run finishes.
    #[serde(default)]
    pub cleanup_uploads: bool,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub knowledge_base: KnowledgeBaseConfig,
    #[serde(default)]
    pub polling: PollingConfig,
}

impl ResearchConfig {
    /// Check the configuration once before any work starts.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ai.model.trim().is_empty() {
            return Err(ConfigError::Invalid("ai.model must not be empty".to_string()));
        }
        url::Url::parse(&self.ai.base_url).map_err(|e| {
            ConfigError::Invalid(format!("ai.base_url '{}' is not a URL: {e}", self.ai.base_url))
        })?;
        if let Some(proxy) = &self.ai.proxy {
            url::Url::parse(proxy)
                .map_err(|e| ConfigError::Invalid(format!("ai.proxy '{proxy}' is not a URL: {e}")))?;
        }
        if self.ai.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "ai.request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.polling.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "polling.interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.knowledge_base.text_extensions.is_empty()
            && self.knowledge_base.document_extensions.is_empty()
        {
            return Err(ConfigError::Invalid(
                "knowledge_base needs at least one text or document extension".to_string(),
            ));
        }
        Ok(())
    }
}
