//! Knowledge-base folder loader.
//!
//! Reads text notes inline and registers documents with the remote file
//! service, waiting until every document is usable.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::KnowledgeBaseConfig;
use crate::error::ResearchError;
use crate::gemini::FileService;
use crate::upload::{display_name, wait_for_active, PollPolicy};

use super::{KnowledgeBase, KnowledgeEntry, TextEntry};

/// Files found in the folder, split by how they are consumed.
#[derive(Debug, Default)]
struct Discovered {
    texts: Vec<PathBuf>,
    documents: Vec<PathBuf>,
}

/// Builds a [`KnowledgeBase`] from a local folder.
pub struct KnowledgeBaseLoader {
    files: Arc<dyn FileService>,
    policy: PollPolicy,
    text_extensions: Vec<String>,
    document_extensions: Vec<String>,
}

impl KnowledgeBaseLoader {
    /// Loader for `.md`/`.txt` notes and `.pdf` documents.
    #[must_use]
    pub fn new(files: Arc<dyn FileService>, policy: PollPolicy) -> Self {
        let defaults = KnowledgeBaseConfig::default();
        Self {
            files,
            policy,
            text_extensions: defaults.text_extensions,
            document_extensions: defaults.document_extensions,
        }
    }

    /// Loader using the extensions from configuration.
    #[must_use]
    pub fn from_config(
        files: Arc<dyn FileService>,
        policy: PollPolicy,
        config: &KnowledgeBaseConfig,
    ) -> Self {
        Self {
            files,
            policy,
            text_extensions: normalize(&config.text_extensions),
            document_extensions: normalize(&config.document_extensions),
        }
    }

    /// Load every matching file directly inside `folder`.
    ///
    /// Notes come first, then documents; each group is ordered by file name.
    /// All documents are uploaded before any is polled. The load fails as a
    /// whole if any document does not become active. A folder that does not
    /// exist yields an empty knowledge base.
    ///
    /// # Errors
    ///
    /// Returns `ResearchError::Io` if the folder cannot be listed (e.g. it is
    /// a regular file), `ResearchError::Decode` for a note that is not UTF-8,
    /// and the upload/polling errors of [`wait_for_active`].
    pub async fn load(&self, folder: &Path) -> Result<KnowledgeBase, ResearchError> {
        tracing::info!(folder = %folder.display(), "Loading knowledge base");

        let discovered = self.discover(folder).await?;
        let mut entries = Vec::with_capacity(discovered.texts.len() + discovered.documents.len());

        for path in &discovered.texts {
            entries.push(KnowledgeEntry::Text(read_note(path).await?));
        }

        if !discovered.documents.is_empty() {
            tracing::info!(count = discovered.documents.len(), "Uploading documents");
            let mut pending = Vec::with_capacity(discovered.documents.len());
            for path in &discovered.documents {
                let handle = self
                    .files
                    .upload(path)
                    .await
                    .map_err(ResearchError::Upload)?;
                pending.push(handle);
            }
            let ready = wait_for_active(self.files.as_ref(), pending, self.policy).await?;
            entries.extend(ready.into_iter().map(KnowledgeEntry::Document));
        }

        let kb = KnowledgeBase::new(folder, entries);
        tracing::info!(
            notes = kb.text_count(),
            documents = kb.document_count(),
            "Knowledge base loaded"
        );
        Ok(kb)
    }

    /// Delete the knowledge base's documents from the remote service.
    ///
    /// Failures are logged and skipped.
    pub async fn release(&self, kb: &KnowledgeBase) {
        for handle in kb.documents() {
            if let Err(e) = self.files.delete(&handle.name).await {
                tracing::warn!(file = %handle.file_name(), error = %e, "Failed to delete upload");
            }
        }
    }

    async fn discover(&self, folder: &Path) -> Result<Discovered, ResearchError> {
        let mut dir = match tokio::fs::read_dir(folder).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    folder = %folder.display(),
                    "Knowledge-base folder not found, continuing without it"
                );
                return Ok(Discovered::default());
            }
            Err(e) => {
                return Err(ResearchError::Io {
                    path: folder.to_path_buf(),
                    source: e,
                })
            }
        };

        let io_err = |source| ResearchError::Io {
            path: folder.to_path_buf(),
            source,
        };

        let mut found = Discovered::default();
        while let Some(entry) = dir.next_entry().await.map_err(io_err)? {
            let path = entry.path();
            // Follows symlinks; subdirectories are skipped.
            let is_file = tokio::fs::metadata(&path)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }
            let Some(ext) = path
                .extension()
                .map(|e| e.to_string_lossy().to_ascii_lowercase())
            else {
                continue;
            };

            if self.text_extensions.contains(&ext) {
                found.texts.push(path);
            } else if self.document_extensions.contains(&ext) {
                found.documents.push(path);
            } else {
                tracing::trace!(path = %path.display(), "Skipping unsupported file");
            }
        }

        // Directory iteration order is filesystem-defined.
        found.texts.sort_by_key(|p| p.file_name().map(ToOwned::to_owned));
        found.documents.sort_by_key(|p| p.file_name().map(ToOwned::to_owned));

        tracing::debug!(
            texts = found.texts.len(),
            documents = found.documents.len(),
            "Discovered knowledge-base files"
        );
        Ok(found)
    }
}

async fn read_note(path: &Path) -> Result<TextEntry, ResearchError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| ResearchError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let raw = String::from_utf8(bytes).map_err(|_| ResearchError::Decode {
        path: path.to_path_buf(),
    })?;
    Ok(TextEntry::new(display_name(path), &raw))
}

/// Lowercase extensions without a leading dot or glob prefix.
fn normalize(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|e| e.trim_start_matches('*').trim_start_matches('.').to_ascii_lowercase())
        .collect()
}
