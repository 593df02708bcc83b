//! Colored CLI display utilities for research runs.
//!
//! Progress lines go to stdout with a timestamp and a colored tag; the
//! analysis report is printed between banner lines.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;

use crate::analysis::AnalysisResult;
use crate::knowledge::KnowledgeBase;

/// Width of the report banner.
const BANNER_WIDTH: usize = 30;

/// Get current timestamp in the same format as tracing.
fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Truncate a string to a maximum number of characters, adding ellipsis if truncated.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars <= 3 {
        "...".to_string()
    } else {
        let kept: String = s.chars().take(max_chars - 3).collect();
        format!("{kept}...")
    }
}

/// Banner line framing the report title.
#[must_use]
pub fn banner(title: &str) -> String {
    let bar = "=".repeat(BANNER_WIDTH);
    format!("{bar} {title} {bar}")
}

/// Human-readable time left before an upload expires.
#[must_use]
pub fn format_expiry(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let left = expires_at - now;
    if left.num_seconds() <= 0 {
        "expired".to_string()
    } else if left.num_hours() > 0 {
        format!("expires in {}h", left.num_hours())
    } else {
        format!("expires in {}m", left.num_minutes().max(1))
    }
}

/// Print knowledge-base loading start.
pub fn print_loading(folder: &str) {
    println!(
        "{} {} Loading knowledge base: {}",
        timestamp().dimmed(),
        "[KB]".blue().bold(),
        folder.cyan()
    );
    let _ = io::stdout().flush();
}

/// Print a summary of the loaded knowledge base.
pub fn print_knowledge_base(kb: &KnowledgeBase) {
    println!(
        "{} {} Loaded {} text notes and {} documents",
        timestamp().dimmed(),
        "[KB]".blue().bold(),
        kb.text_count().to_string().green(),
        kb.document_count().to_string().green()
    );
    let now = Utc::now();
    for handle in kb.documents() {
        let expiry = handle
            .expires_at
            .map_or(String::new(), |at| format_expiry(at, now));
        println!(
            "     {} {} {}",
            truncate(&handle.file_name(), 60),
            handle.name.dimmed(),
            expiry.dimmed()
        );
    }
    let _ = io::stdout().flush();
}

/// Print analysis start for a paper.
pub fn print_analyzing(paper: &str, model: &str) {
    println!(
        "{} {} {} (model={})",
        timestamp().dimmed(),
        "[ANALYZE]".magenta().bold(),
        paper,
        model.cyan()
    );
    let _ = io::stdout().flush();
}

/// Print the analysis report. In raw mode only the model text is printed.
pub fn print_report(result: &AnalysisResult, raw_mode: bool) {
    if raw_mode {
        println!("{}", result.text);
    } else {
        println!();
        println!("{}", banner("Analysis Report").bold());
        println!("{}", result.paper.display().to_string().dimmed());
        println!();
        println!("{}", result.text);
        println!("{}", "=".repeat(BANNER_WIDTH * 2 + "Analysis Report".len() + 2));
    }
    let _ = io::stdout().flush();
}

/// Print an error message.
pub fn print_error(message: &str) {
    println!("{} {}", "[ERROR]".red().bold(), message);
    let _ = io::stdout().flush();
}
