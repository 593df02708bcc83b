//! Gemini API access: the remote file store and content generation.

mod client;
mod service;
mod wire;

pub use client::GeminiClient;
pub use service::{AiError, ContentGenerator, FileService, Part};
