//! Request and response bodies of the Gemini REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::upload::FileState;

use super::Part;

/// File resource as returned by the Files API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    pub name: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub state: FileState,
    #[serde(default)]
    pub expiration_time: Option<DateTime<Utc>>,
}

/// Envelope around the file returned by a finalized upload.
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub file: RemoteFile,
}

#[derive(Debug, Serialize)]
pub struct StartUploadRequest<'a> {
    pub file: UploadMetadata<'a>,
}

#[derive(Debug, Serialize)]
pub struct UploadMetadata<'a> {
    pub display_name: &'a str,
}

/// `generateContent` request body.
#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Content<'a> {
    pub role: &'static str,
    pub parts: Vec<WirePart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum WirePart<'a> {
    Text { text: &'a str },
    File { file_data: FileData<'a> },
}

#[derive(Debug, Serialize)]
pub struct FileData<'a> {
    pub mime_type: &'a str,
    pub file_uri: &'a str,
}

impl<'a> From<&'a Part> for WirePart<'a> {
    fn from(part: &'a Part) -> Self {
        match part {
            Part::Text(text) => Self::Text { text },
            Part::Document(handle) => Self::File {
                file_data: FileData {
                    mime_type: &handle.mime_type,
                    file_uri: &handle.uri,
                },
            },
        }
    }
}

impl<'a> GenerateRequest<'a> {
    /// Single user turn carrying every part in order.
    #[must_use]
    pub fn from_parts(parts: &'a [Part]) -> Self {
        Self {
            contents: vec![Content {
                role: "user",
                parts: parts.iter().map(WirePart::from).collect(),
            }],
        }
    }
}

/// `generateContent` response body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    ///
    /// Returns `Err` with a human-readable reason when there is no text.
    pub fn text(&self) -> Result<String, String> {
        let Some(candidate) = self.candidates.first() else {
            let reason = self
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref())
                .unwrap_or("no candidates returned");
            return Err(format!("Gemini returned no candidates ({reason})"));
        };

        let text: String = candidate
            .content
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .collect();

        if text.is_empty() {
            let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
            return Err(format!("No text in Gemini response (finish reason: {reason})"));
        }
        Ok(text)
    }
}
