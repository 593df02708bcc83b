//! Integration tests for paper analysis sequencing.

mod common;

use std::path::PathBuf;
use std::sync::Arc;

use common::{fast_policy, write_file, MockRemote};
use paper_scout::analysis::{PaperAnalyzer, ANALYSIS_PROMPT, KNOWLEDGE_BASE_HEADER, TARGET_MARKER};
use paper_scout::gemini::AiError;
use paper_scout::knowledge::{KnowledgeBase, KnowledgeBaseLoader, KnowledgeEntry};
use paper_scout::upload::{FileState, UploadHandle};
use paper_scout::ResearchError;
use tempfile::TempDir;

const MODEL: &str = "gemini-2.5-flash";

fn analyzer(remote: &Arc<MockRemote>) -> PaperAnalyzer {
    PaperAnalyzer::new(remote.clone(), remote.clone(), MODEL, fast_policy())
}

#[tokio::test]
async fn test_note_and_pdf_scenario() {
    let kb_dir = TempDir::new().unwrap();
    write_file(kb_dir.path(), "a.md", b"Note A");
    write_file(kb_dir.path(), "b.pdf", b"%PDF b");
    let papers = TempDir::new().unwrap();
    let target = write_file(papers.path(), "new.pdf", b"%PDF new");

    let remote = Arc::new(
        MockRemote::new()
            .script("b.pdf", &[FileState::Processing, FileState::Active])
            .script("new.pdf", &[FileState::Processing, FileState::Processing, FileState::Active]),
    );
    let kb = KnowledgeBaseLoader::new(remote.clone(), fast_policy())
        .load(kb_dir.path())
        .await
        .unwrap();
    assert_eq!(kb.text_count(), 1);
    assert_eq!(kb.document_count(), 1);

    let result = analyzer(&remote).analyze(&target, &kb).await.unwrap();

    assert_eq!(result.text, "mock analysis");
    assert_eq!(result.model, MODEL);
    assert_eq!(result.paper, target);
    assert_eq!(remote.upload_names(), vec!["b.pdf", "new.pdf"]);

    let generations = remote.generations();
    assert_eq!(generations.len(), 1);
    let (model, parts) = &generations[0];
    assert_eq!(model, MODEL);
    assert_eq!(parts.len(), 5);
    assert_eq!(parts[0].as_text(), Some(ANALYSIS_PROMPT));
    let block = parts[1].as_text().unwrap();
    assert!(block.starts_with(KNOWLEDGE_BASE_HEADER));
    assert!(block.contains("--- reference: a.md ---\nNote A\n"));
    assert_eq!(parts[2].as_document().unwrap().file_name(), "b.pdf");
    assert_eq!(parts[3].as_text(), Some(TARGET_MARKER));
    assert_eq!(parts[4].as_document().unwrap().file_name(), "new.pdf");

    assert_eq!(remote.states_at_generate(), vec![FileState::Active, FileState::Active]);
}

#[tokio::test]
async fn test_missing_target_makes_no_remote_calls() {
    let papers = TempDir::new().unwrap();
    let missing = papers.path().join("new_paper_to_analyze.pdf");

    let remote = Arc::new(MockRemote::new());
    let result = analyzer(&remote)
        .analyze(&missing, &KnowledgeBase::empty())
        .await;

    assert!(matches!(result, Err(ResearchError::NotFound(p)) if p == missing));
    assert!(remote.uploads().is_empty());
    assert!(remote.status_queries().is_empty());
    assert!(remote.generations().is_empty());
}

#[tokio::test]
async fn test_directory_target_is_not_found() {
    let papers = TempDir::new().unwrap();

    let remote = Arc::new(MockRemote::new());
    let result = analyzer(&remote)
        .analyze(papers.path(), &KnowledgeBase::empty())
        .await;

    assert!(matches!(result, Err(ResearchError::NotFound(_))));
    assert!(remote.uploads().is_empty());
}

#[tokio::test]
async fn test_failed_target_skips_generation() {
    let papers = TempDir::new().unwrap();
    let target = write_file(papers.path(), "broken.pdf", b"not really a pdf");

    let remote = Arc::new(
        MockRemote::new().script("broken.pdf", &[FileState::Processing, FileState::Failed]),
    );
    let result = analyzer(&remote)
        .analyze(&target, &KnowledgeBase::empty())
        .await;

    assert!(matches!(
        result,
        Err(ResearchError::UploadFailed { ref file, state: FileState::Failed }) if file == "broken.pdf"
    ));
    assert!(remote.generations().is_empty());
}

#[tokio::test]
async fn test_stuck_target_times_out() {
    let papers = TempDir::new().unwrap();
    let target = write_file(papers.path(), "slow.pdf", b"%PDF");

    let remote = Arc::new(MockRemote::new().script("slow.pdf", &[FileState::Processing]));
    let policy = paper_scout::upload::PollPolicy::new(
        std::time::Duration::from_millis(2),
        Some(std::time::Duration::from_millis(20)),
    );
    let result = PaperAnalyzer::new(remote.clone(), remote.clone(), MODEL, policy)
        .analyze(&target, &KnowledgeBase::empty())
        .await;

    assert!(matches!(result, Err(ResearchError::PollTimeout { .. })));
    assert!(remote.generations().is_empty());
}

#[tokio::test]
async fn test_generation_error_propagates() {
    let papers = TempDir::new().unwrap();
    let target = write_file(papers.path(), "new.pdf", b"%PDF");

    let remote = Arc::new(MockRemote::new().failing_generation());
    let result = analyzer(&remote)
        .analyze(&target, &KnowledgeBase::empty())
        .await;

    match result {
        Err(ResearchError::Generation(AiError::RequestFailed(msg))) => {
            assert!(msg.contains("500"));
        }
        other => panic!("expected Generation error, got {other:?}"),
    }
    assert_eq!(remote.generations().len(), 1);
}

#[tokio::test]
async fn test_repeat_analysis_is_not_memoized() {
    let kb_dir = TempDir::new().unwrap();
    write_file(kb_dir.path(), "a.md", b"Note A");
    write_file(kb_dir.path(), "b.pdf", b"%PDF b");
    let papers = TempDir::new().unwrap();
    let target = write_file(papers.path(), "new.pdf", b"%PDF new");

    let remote = Arc::new(MockRemote::new());
    let kb = KnowledgeBaseLoader::new(remote.clone(), fast_policy())
        .load(kb_dir.path())
        .await
        .unwrap();
    let analyzer = analyzer(&remote);

    analyzer.analyze(&target, &kb).await.unwrap();
    analyzer.analyze(&target, &kb).await.unwrap();

    // One knowledge-base upload plus two target uploads.
    assert_eq!(remote.upload_names(), vec!["b.pdf", "new.pdf", "new.pdf"]);
    let generations = remote.generations();
    assert_eq!(generations.len(), 2);
    let first_target = generations[0].1.last().unwrap().as_document().unwrap().uri.clone();
    let second_target = generations[1].1.last().unwrap().as_document().unwrap().uri.clone();
    assert_ne!(first_target, second_target);
}

#[tokio::test]
async fn test_cleanup_deletes_target_upload() {
    let papers = TempDir::new().unwrap();
    let target = write_file(papers.path(), "new.pdf", b"%PDF");

    let remote = Arc::new(MockRemote::new());
    analyzer(&remote)
        .with_cleanup(true)
        .analyze(&target, &KnowledgeBase::empty())
        .await
        .unwrap();

    assert_eq!(remote.deletions(), vec!["files/new.pdf"]);
}

#[tokio::test]
async fn test_no_cleanup_by_default() {
    let papers = TempDir::new().unwrap();
    let target = write_file(papers.path(), "new.pdf", b"%PDF");

    let remote = Arc::new(MockRemote::new());
    analyzer(&remote)
        .analyze(&target, &KnowledgeBase::empty())
        .await
        .unwrap();

    assert!(remote.deletions().is_empty());
}

#[tokio::test]
async fn test_cleanup_after_failed_target() {
    let papers = TempDir::new().unwrap();
    let target = write_file(papers.path(), "broken.pdf", b"%PDF");

    let remote = Arc::new(MockRemote::new().script("broken.pdf", &[FileState::Failed]));
    let result = analyzer(&remote)
        .with_cleanup(true)
        .analyze(&target, &KnowledgeBase::empty())
        .await;

    assert!(matches!(result, Err(ResearchError::UploadFailed { .. })));
    assert_eq!(remote.deletions(), vec!["files/broken.pdf"]);
    assert!(remote.generations().is_empty());
}

#[tokio::test]
async fn test_cleanup_after_request_assembly_fails() {
    let papers = TempDir::new().unwrap();
    let target = write_file(papers.path(), "new.pdf", b"%PDF");
    let stale = UploadHandle {
        name: "files/old.pdf".to_string(),
        uri: "https://mock.invalid/v1beta/files/old.pdf".to_string(),
        mime_type: "application/pdf".to_string(),
        source_path: PathBuf::from("old.pdf"),
        state: FileState::Processing,
        expires_at: None,
    };
    let kb = KnowledgeBase::new("/kb", vec![KnowledgeEntry::Document(stale)]);

    let remote = Arc::new(MockRemote::new());
    let result = analyzer(&remote).with_cleanup(true).analyze(&target, &kb).await;

    assert!(matches!(result, Err(ResearchError::InactiveHandle { ref file, .. }) if file == "old.pdf"));
    assert_eq!(remote.deletions(), vec!["files/new.pdf"]);
    assert!(remote.generations().is_empty());
}
