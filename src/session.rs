//! A full research run: load the knowledge base once, then analyze each
//! paper against it in order.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::analysis::{AnalysisResult, PaperAnalyzer};
use crate::config::ResearchConfig;
use crate::error::ResearchError;
use crate::gemini::{ContentGenerator, FileService, GeminiClient};
use crate::knowledge::{KnowledgeBase, KnowledgeBaseLoader};

/// Progress reported while a run executes.
#[derive(Debug)]
pub enum RunEvent<'a> {
    /// The knowledge-base folder is about to be loaded.
    Loading(&'a Path),
    /// The knowledge base is ready.
    Loaded(&'a KnowledgeBase),
    /// A paper is about to be analyzed.
    Analyzing { paper: &'a Path, model: &'a str },
    /// A paper's report is available.
    Report(&'a AnalysisResult),
}

/// Runs the knowledge-base load and the paper analyses of one invocation.
pub struct ResearchSession {
    loader: KnowledgeBaseLoader,
    analyzer: PaperAnalyzer,
    folder: PathBuf,
    release_on_finish: bool,
}

impl ResearchSession {
    #[must_use]
    pub fn new(
        loader: KnowledgeBaseLoader,
        analyzer: PaperAnalyzer,
        folder: impl Into<PathBuf>,
    ) -> Self {
        Self {
            loader,
            analyzer,
            folder: folder.into(),
            release_on_finish: false,
        }
    }

    /// Delete the knowledge base's uploads when the run ends.
    #[must_use]
    pub fn with_release(mut self, release: bool) -> Self {
        self.release_on_finish = release;
        self
    }

    /// Session wired to the given services as described by `config`.
    #[must_use]
    pub fn from_config(
        files: Arc<dyn FileService>,
        generator: Arc<dyn ContentGenerator>,
        config: &ResearchConfig,
    ) -> Self {
        let policy = config.polling.policy();
        let loader = KnowledgeBaseLoader::from_config(files.clone(), policy, &config.knowledge_base);
        let analyzer = PaperAnalyzer::new(files, generator, config.ai.model.clone(), policy)
            .with_cleanup(config.cleanup_uploads);
        Self::new(loader, analyzer, config.knowledge_base.folder.clone())
            .with_release(config.cleanup_uploads)
    }

    /// Validate `config` and connect to Gemini.
    ///
    /// # Errors
    ///
    /// Returns `ResearchError::Config` for an invalid configuration and
    /// `ResearchError::Client` if the client cannot be built, e.g. because
    /// the API key is not set.
    pub fn connect(config: &ResearchConfig) -> Result<Self, ResearchError> {
        config.validate()?;
        let client =
            Arc::new(GeminiClient::from_config(&config.ai).map_err(ResearchError::Client)?);
        Ok(Self::from_config(client.clone(), client, config))
    }

    /// Analyze `papers` in order against a freshly loaded knowledge base.
    ///
    /// Every paper path is checked before anything is uploaded. The first
    /// failing paper ends the run; papers after it are not analyzed. When
    /// release is enabled the knowledge-base uploads are deleted on both
    /// outcomes.
    ///
    /// # Errors
    ///
    /// Returns `ResearchError::NotFound` for a missing paper, and otherwise
    /// the first error from loading or analysis.
    pub async fn run(
        &self,
        papers: &[PathBuf],
        mut on_event: impl FnMut(RunEvent<'_>),
    ) -> Result<Vec<AnalysisResult>, ResearchError> {
        if let Some(missing) = papers.iter().find(|p| !p.is_file()) {
            return Err(ResearchError::NotFound(missing.clone()));
        }

        on_event(RunEvent::Loading(&self.folder));
        let kb = self.loader.load(&self.folder).await?;
        on_event(RunEvent::Loaded(&kb));

        let mut results = Vec::with_capacity(papers.len());
        let mut outcome = Ok(());
        for paper in papers {
            on_event(RunEvent::Analyzing {
                paper,
                model: self.analyzer.model(),
            });
            match self.analyzer.analyze(paper, &kb).await {
                Ok(result) => {
                    on_event(RunEvent::Report(&result));
                    results.push(result);
                }
                Err(e) => {
                    tracing::warn!(paper = %paper.display(), error = %e, "Stopping run");
                    outcome = Err(e);
                    break;
                }
            }
        }

        if self.release_on_finish {
            self.loader.release(&kb).await;
        }
        outcome.map(|()| results)
    }
}
