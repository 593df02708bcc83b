//! Paper Scout - analyze new research papers against a local knowledge base.

pub mod analysis;
pub mod config;
pub mod display;
pub mod error;
pub mod gemini;
pub mod knowledge;
pub mod session;
pub mod upload;

pub use error::ResearchError;
