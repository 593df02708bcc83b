//! Shared test doubles for the remote services.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use paper_scout::gemini::{AiError, ContentGenerator, FileService, Part};
use paper_scout::upload::{FileState, PollPolicy, UploadHandle};

/// Records every remote call and replays scripted processing states.
#[derive(Default)]
pub struct MockRemote {
    /// States returned by successive status queries, keyed by file name.
    scripts: Mutex<HashMap<String, Vec<FileState>>>,
    uploads: Mutex<Vec<PathBuf>>,
    status_queries: Mutex<Vec<String>>,
    deletions: Mutex<Vec<String>>,
    generations: Mutex<Vec<(String, Vec<Part>)>>,
    /// Response text, or `None` to fail generation.
    response: Mutex<Option<String>>,
    /// Every handle's state at the moment `generate` was called.
    states_at_generate: Mutex<Vec<FileState>>,
    /// State reported by `upload`; `Processing` unless overridden.
    upload_state: Mutex<Option<FileState>>,
}

impl MockRemote {
    pub fn new() -> Self {
        let mock = Self::default();
        *mock.response.lock().unwrap() = Some("mock analysis".to_string());
        mock
    }

    /// Script the states reported for `file_name` after upload.
    /// The last state repeats.
    pub fn script(self, file_name: &str, states: &[FileState]) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(file_name.to_string(), states.iter().rev().copied().collect());
        self
    }

    /// Report `state` in every upload response.
    pub fn upload_state(self, state: FileState) -> Self {
        *self.upload_state.lock().unwrap() = Some(state);
        self
    }

    pub fn failing_generation(self) -> Self {
        *self.response.lock().unwrap() = None;
        self
    }

    pub fn uploads(&self) -> Vec<PathBuf> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn upload_names(&self) -> Vec<String> {
        self.uploads()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    pub fn status_queries(&self) -> Vec<String> {
        self.status_queries.lock().unwrap().clone()
    }

    pub fn deletions(&self) -> Vec<String> {
        self.deletions.lock().unwrap().clone()
    }

    pub fn generations(&self) -> Vec<(String, Vec<Part>)> {
        self.generations.lock().unwrap().clone()
    }

    pub fn states_at_generate(&self) -> Vec<FileState> {
        self.states_at_generate.lock().unwrap().clone()
    }

    fn remote_name(path: &Path) -> String {
        format!("files/{}", path.file_name().unwrap().to_string_lossy())
    }
}

#[async_trait]
impl FileService for MockRemote {
    async fn upload(&self, path: &Path) -> Result<UploadHandle, AiError> {
        let count = {
            let mut uploads = self.uploads.lock().unwrap();
            uploads.push(path.to_path_buf());
            uploads.len()
        };
        let name = Self::remote_name(path);
        Ok(UploadHandle {
            uri: format!("https://mock.invalid/v1beta/{name}#{count}"),
            name,
            mime_type: "application/pdf".to_string(),
            source_path: path.to_path_buf(),
            state: self.upload_state.lock().unwrap().unwrap_or(FileState::Processing),
            expires_at: None,
        })
    }

    async fn get_status(&self, name: &str) -> Result<FileState, AiError> {
        self.status_queries.lock().unwrap().push(name.to_string());
        let file_name = name.trim_start_matches("files/");
        let mut scripts = self.scripts.lock().unwrap();
        let Some(script) = scripts.get_mut(file_name) else {
            return Ok(FileState::Active);
        };
        Ok(if script.len() > 1 {
            script.pop().unwrap()
        } else {
            script[0]
        })
    }

    async fn delete(&self, name: &str) -> Result<(), AiError> {
        self.deletions.lock().unwrap().push(name.to_string());
        Ok(())
    }
}

#[async_trait]
impl ContentGenerator for MockRemote {
    async fn generate(&self, model: &str, parts: &[Part]) -> Result<String, AiError> {
        self.states_at_generate
            .lock()
            .unwrap()
            .extend(parts.iter().filter_map(Part::as_document).map(|h| h.state));
        self.generations
            .lock()
            .unwrap()
            .push((model.to_string(), parts.to_vec()));
        self.response
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AiError::RequestFailed("HTTP 500 Internal Server Error: boom".to_string()))
    }
}

/// Polling policy fast enough for tests.
pub fn fast_policy() -> PollPolicy {
    PollPolicy::new(Duration::from_millis(1), Some(Duration::from_secs(5)))
}

/// Write `content` to `dir/name`.
pub fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}
