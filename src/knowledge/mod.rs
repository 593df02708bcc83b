//! Local knowledge base used as context for paper analysis.
//!
//! Two kinds of material are supported:
//! - Text notes (`.md`, `.txt`), read locally and sent inline
//! - Documents (`.pdf`), uploaded to the remote file service

mod base;
mod loader;

pub use base::*;
pub use loader::*;
