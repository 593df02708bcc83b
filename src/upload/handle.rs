//! Remote document handles and their processing states.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Processing state of a document held by the remote file service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileState {
    /// The service has not reported a state.
    #[default]
    #[serde(rename = "STATE_UNSPECIFIED")]
    Unspecified,
    /// Accepted and still being processed.
    #[serde(rename = "PROCESSING")]
    Processing,
    /// Ready to be referenced in a generation request.
    #[serde(rename = "ACTIVE")]
    Active,
    /// Processing failed; the document is unusable.
    #[serde(rename = "FAILED")]
    Failed,
}

impl FileState {
    /// Whether the service is still working on the document.
    #[must_use]
    pub fn is_processing(self) -> bool {
        self == Self::Processing
    }

    /// Whether the document may be used in a request.
    #[must_use]
    pub fn is_active(self) -> bool {
        self == Self::Active
    }

    /// Wire name of the state.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "STATE_UNSPECIFIED",
            Self::Processing => "PROCESSING",
            Self::Active => "ACTIVE",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document registered with the remote file service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadHandle {
    /// Remote resource name, e.g. `files/abc123`.
    pub name: String,
    /// URI used to reference the document from a generation request.
    pub uri: String,
    /// MIME type the document was uploaded with.
    pub mime_type: String,
    /// Local file the document was uploaded from.
    pub source_path: PathBuf,
    /// Last known processing state.
    pub state: FileState,
    /// When the service will discard the document, if reported.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl UploadHandle {
    /// File name of the local source, used to identify the document in logs and errors.
    #[must_use]
    pub fn file_name(&self) -> String {
        display_name(&self.source_path)
    }

    /// Copy of this handle carrying a newer state.
    #[must_use]
    pub fn with_state(&self, state: FileState) -> Self {
        Self {
            state,
            ..self.clone()
        }
    }
}

/// Last path component as a lossy string, falling back to the whole path.
#[must_use]
pub fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// MIME type for a local file, chosen by extension.
#[must_use]
pub fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("md" | "markdown") => "text/markdown",
        Some("txt") => "text/plain",
        Some("html" | "htm") => "text/html",
        _ => "application/octet-stream",
    }
}
