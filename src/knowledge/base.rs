//! Loaded knowledge-base contents.

use std::path::{Path, PathBuf};

use crate::upload::UploadHandle;

/// A note read locally and sent inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEntry {
    /// File name the note was read from.
    pub filename: String,
    /// Note text prefixed with its provenance header.
    pub content: String,
}

impl TextEntry {
    /// Wrap raw note text with a header naming its source file.
    #[must_use]
    pub fn new(filename: impl Into<String>, raw: &str) -> Self {
        let filename = filename.into();
        let content = format!("--- reference: {filename} ---\n{raw}\n");
        Self { filename, content }
    }
}

/// One item of the knowledge base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnowledgeEntry {
    /// Inline text.
    Text(TextEntry),
    /// Document held by the remote file service.
    Document(UploadHandle),
}

/// Everything loaded from the knowledge-base folder, in discovery order.
///
/// Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    folder: PathBuf,
    entries: Vec<KnowledgeEntry>,
}

impl KnowledgeBase {
    #[must_use]
    pub fn new(folder: impl Into<PathBuf>, entries: Vec<KnowledgeEntry>) -> Self {
        Self {
            folder: folder.into(),
            entries,
        }
    }

    /// An empty knowledge base, for analyzing a paper without context.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    #[must_use]
    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    /// Inline notes in discovery order.
    pub fn texts(&self) -> impl Iterator<Item = &TextEntry> {
        self.entries.iter().filter_map(|entry| match entry {
            KnowledgeEntry::Text(text) => Some(text),
            KnowledgeEntry::Document(_) => None,
        })
    }

    /// Uploaded documents in discovery order.
    pub fn documents(&self) -> impl Iterator<Item = &UploadHandle> {
        self.entries.iter().filter_map(|entry| match entry {
            KnowledgeEntry::Document(handle) => Some(handle),
            KnowledgeEntry::Text(_) => None,
        })
    }

    #[must_use]
    pub fn text_count(&self) -> usize {
        self.texts().count()
    }

    #[must_use]
    pub fn document_count(&self) -> usize {
        self.documents().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
