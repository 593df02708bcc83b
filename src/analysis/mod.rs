//! Analysis of a new paper against the knowledge base.

mod analyzer;
mod prompts;
mod request;
mod state;

pub use analyzer::{AnalysisResult, PaperAnalyzer};
pub use prompts::{format_knowledge_block, ANALYSIS_PROMPT, KNOWLEDGE_BASE_HEADER, TARGET_MARKER};
pub use request::AnalysisRequest;
pub use state::{AnalysisState, AnalysisStateMachine};
