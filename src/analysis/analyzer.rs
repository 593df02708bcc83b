//! Paper analysis against a loaded knowledge base.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::error::ResearchError;
use crate::gemini::{ContentGenerator, FileService};
use crate::knowledge::KnowledgeBase;
use crate::upload::{wait_until_active, PollPolicy, UploadHandle};

use super::{AnalysisRequest, AnalysisState, AnalysisStateMachine};

/// Model output for one paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    /// Paper that was analyzed.
    pub paper: PathBuf,
    /// Model that produced the report.
    pub model: String,
    /// Raw response text.
    pub text: String,
}

/// Runs analyses of single papers. Holds no per-run state between calls.
pub struct PaperAnalyzer {
    files: Arc<dyn FileService>,
    generator: Arc<dyn ContentGenerator>,
    model: String,
    policy: PollPolicy,
    cleanup: bool,
}

impl PaperAnalyzer {
    #[must_use]
    pub fn new(
        files: Arc<dyn FileService>,
        generator: Arc<dyn ContentGenerator>,
        model: impl Into<String>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            files,
            generator,
            model: model.into(),
            policy,
            cleanup: false,
        }
    }

    /// Delete the target upload once the analysis finishes, whether or not
    /// it succeeded.
    #[must_use]
    pub fn with_cleanup(mut self, cleanup: bool) -> Self {
        self.cleanup = cleanup;
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Analyze `target` with `kb` as background.
    ///
    /// Every call uploads the target anew and issues exactly one generation
    /// request.
    ///
    /// # Errors
    ///
    /// Returns `ResearchError::NotFound` before any remote call if `target`
    /// is not a file, upload/polling errors if the target never becomes
    /// active, `ResearchError::InactiveHandle` if a knowledge-base document
    /// is not usable, and `ResearchError::Generation` if the model call fails.
    pub async fn analyze(
        &self,
        target: &Path,
        kb: &KnowledgeBase,
    ) -> Result<AnalysisResult, ResearchError> {
        let is_file = tokio::fs::metadata(target)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(ResearchError::NotFound(target.to_path_buf()));
        }

        let mut machine = AnalysisStateMachine::new();
        tracing::info!(paper = %target.display(), model = %self.model, "Analyzing paper");

        machine.transition(AnalysisState::TargetUploading);
        let uploaded = match self.files.upload(target).await {
            Ok(handle) => handle,
            Err(e) => {
                machine.transition(AnalysisState::Failed);
                return Err(ResearchError::Upload(e));
            }
        };
        let remote_name = uploaded.name.clone();

        let outcome = self.generate_for(&mut machine, uploaded, kb).await;

        if self.cleanup {
            if let Err(e) = self.files.delete(&remote_name).await {
                tracing::warn!(name = %remote_name, error = %e, "Failed to delete upload");
            }
        }

        match outcome {
            Ok(text) => {
                machine.transition(AnalysisState::Done);
                tracing::info!(paper = %target.display(), chars = text.len(), "Analysis complete");
                Ok(AnalysisResult {
                    paper: target.to_path_buf(),
                    model: self.model.clone(),
                    text,
                })
            }
            Err(e) => {
                machine.transition(AnalysisState::Failed);
                Err(e)
            }
        }
    }

    /// Wait for the uploaded target, assemble the request and run the model.
    async fn generate_for(
        &self,
        machine: &mut AnalysisStateMachine,
        uploaded: UploadHandle,
        kb: &KnowledgeBase,
    ) -> Result<String, ResearchError> {
        let handle = wait_until_active(self.files.as_ref(), uploaded, self.policy).await?;
        machine.transition(AnalysisState::TargetActive);

        let request = AnalysisRequest::build(kb, &handle)?;
        machine.transition(AnalysisState::RequestAssembled);
        tracing::debug!(parts = request.parts().len(), "Request assembled");

        machine.transition(AnalysisState::Generating);
        self.generator
            .generate(&self.model, request.parts())
            .await
            .map_err(ResearchError::Generation)
    }
}
