//! Top-level error types for knowledge-base loading and paper analysis.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::ConfigError;
use crate::gemini::AiError;
use crate::upload::FileState;

/// Errors that abort a load or an analysis run.
#[derive(thiserror::Error, Debug)]
pub enum ResearchError {
    /// A local path the run depends on does not exist.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// An uploaded document settled in a state other than ACTIVE.
    #[error("Upload of {file} failed: remote state is {state}")]
    UploadFailed { file: String, state: FileState },

    /// An uploaded document stayed in PROCESSING past the polling deadline.
    #[error("Timed out after {waited:?} waiting for {file} to become active")]
    PollTimeout { file: String, waited: Duration },

    /// A document that is not ACTIVE was placed into a generation request.
    #[error("Document {file} is not active (state: {state})")]
    InactiveHandle { file: String, state: FileState },

    /// A text note could not be decoded as UTF-8.
    #[error("Failed to decode {} as UTF-8", path.display())]
    Decode { path: PathBuf },

    /// Reading a local file or directory failed.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The Gemini client could not be set up, e.g. the API key is missing.
    #[error("Gemini client setup failed: {0}")]
    Client(#[source] AiError),

    /// The remote upload service rejected or failed a call.
    #[error("Upload service error: {0}")]
    Upload(#[source] AiError),

    /// The generation call failed.
    #[error("Generation failed: {0}")]
    Generation(#[source] AiError),

    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
