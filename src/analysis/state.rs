//! Analysis run state machine.

use serde::{Deserialize, Serialize};

/// Stage of a single analysis run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisState {
    #[default]
    Init,
    TargetUploading,
    TargetActive,
    RequestAssembled,
    Generating,
    Done,
    Failed,
}

impl AnalysisState {
    /// Whether no further transitions are possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Whether `next` may follow this state.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Init, Self::TargetUploading)
                | (Self::TargetUploading, Self::TargetActive | Self::Failed)
                | (Self::TargetActive, Self::RequestAssembled | Self::Failed)
                | (Self::RequestAssembled, Self::Generating)
                | (Self::Generating, Self::Done | Self::Failed)
        )
    }
}

/// Tracks the progress of one analysis run.
#[derive(Debug, Clone, Default)]
pub struct AnalysisStateMachine {
    state: AnalysisState,
}

impl AnalysisStateMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> AnalysisState {
        self.state
    }

    /// Move to `next`. Illegal transitions are ignored and reported as `false`.
    pub fn transition(&mut self, next: AnalysisState) -> bool {
        if !self.state.can_transition_to(next) {
            tracing::warn!(from = ?self.state, to = ?next, "Rejected analysis state transition");
            return false;
        }
        tracing::debug!(from = ?self.state, to = ?next, "Analysis state transition");
        self.state = next;
        true
    }
}
