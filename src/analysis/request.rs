//! Assembly of the ordered generation request.

use crate::error::ResearchError;
use crate::gemini::Part;
use crate::knowledge::KnowledgeBase;
use crate::upload::UploadHandle;

use super::prompts::{format_knowledge_block, ANALYSIS_PROMPT, TARGET_MARKER};

/// Ordered parts sent to the model for one analysis.
///
/// Layout: prompt, optional inline-notes block, knowledge-base documents,
/// target marker, target document. Background always precedes the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    parts: Vec<Part>,
}

impl AnalysisRequest {
    /// Assemble a request for `target` against `kb`.
    ///
    /// # Errors
    ///
    /// Returns `ResearchError::InactiveHandle` if the target or any
    /// knowledge-base document is not ACTIVE.
    pub fn build(kb: &KnowledgeBase, target: &UploadHandle) -> Result<Self, ResearchError> {
        let mut parts = vec![Part::text(ANALYSIS_PROMPT)];

        if kb.text_count() > 0 {
            parts.push(Part::Text(format_knowledge_block(
                kb.texts().map(|t| t.content.as_str()),
            )));
        }

        for handle in kb.documents() {
            ensure_active(handle)?;
            parts.push(Part::Document(handle.clone()));
        }

        ensure_active(target)?;
        parts.push(Part::text(TARGET_MARKER));
        parts.push(Part::Document(target.clone()));

        Ok(Self { parts })
    }

    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }
}

fn ensure_active(handle: &UploadHandle) -> Result<(), ResearchError> {
    if handle.state.is_active() {
        Ok(())
    } else {
        Err(ResearchError::InactiveHandle {
            file: handle.file_name(),
            state: handle.state,
        })
    }
}
