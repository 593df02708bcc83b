//! Waiting for uploaded documents to finish remote processing.

use std::time::Duration;

use tokio::time::Instant;

use crate::error::ResearchError;
use crate::gemini::FileService;

use super::{FileState, UploadHandle};

/// How often and how long to poll an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    interval: Duration,
    timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            timeout: Some(Duration::from_secs(300)),
        }
    }
}

impl PollPolicy {
    /// Create a policy. A `None` timeout polls until the service settles.
    #[must_use]
    pub fn new(interval: Duration, timeout: Option<Duration>) -> Self {
        Self { interval, timeout }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Block until every handle has left PROCESSING and is ACTIVE.
///
/// Handles are polled one after another. The first handle that settles in
/// a state other than ACTIVE stops the wait; remaining handles are not
/// queried. Returns the handles with their refreshed states, in input order.
///
/// # Errors
///
/// Returns `ResearchError::UploadFailed` for a terminal non-ACTIVE state,
/// `ResearchError::PollTimeout` when a handle outlives the policy timeout,
/// and `ResearchError::Upload` when a status query fails.
pub async fn wait_for_active(
    files: &dyn FileService,
    handles: Vec<UploadHandle>,
    policy: PollPolicy,
) -> Result<Vec<UploadHandle>, ResearchError> {
    let mut ready = Vec::with_capacity(handles.len());
    for handle in handles {
        ready.push(wait_until_active(files, handle, policy).await?);
    }
    Ok(ready)
}

/// Block until a single handle is ACTIVE.
///
/// Only an ACTIVE state reported at upload time is trusted as is; any other
/// state is confirmed with the service before the handle is judged.
///
/// # Errors
///
/// Same as [`wait_for_active`].
pub async fn wait_until_active(
    files: &dyn FileService,
    handle: UploadHandle,
    policy: PollPolicy,
) -> Result<UploadHandle, ResearchError> {
    if handle.state.is_active() {
        tracing::debug!(file = %handle.file_name(), name = %handle.name, "Upload already active");
        return Ok(handle);
    }

    let started = Instant::now();
    let mut state = query_state(files, &handle).await?;
    let mut polls: u32 = 1;

    while state.is_processing() {
        if let Some(limit) = policy.timeout {
            let waited = started.elapsed();
            if waited >= limit {
                tracing::warn!(file = %handle.file_name(), ?waited, "Upload polling timed out");
                return Err(ResearchError::PollTimeout {
                    file: handle.file_name(),
                    waited,
                });
            }
        }
        tokio::time::sleep(policy.interval).await;
        state = query_state(files, &handle).await?;
        polls = polls.saturating_add(1);
    }

    if !state.is_active() {
        tracing::warn!(file = %handle.file_name(), %state, "Upload did not become active");
        return Err(ResearchError::UploadFailed {
            file: handle.file_name(),
            state,
        });
    }

    tracing::debug!(file = %handle.file_name(), name = %handle.name, polls, "Upload active");
    Ok(handle.with_state(state))
}

async fn query_state(
    files: &dyn FileService,
    handle: &UploadHandle,
) -> Result<FileState, ResearchError> {
    let state = files
        .get_status(&handle.name)
        .await
        .map_err(ResearchError::Upload)?;
    tracing::trace!(file = %handle.file_name(), %state, "Polled upload state");
    Ok(state)
}
