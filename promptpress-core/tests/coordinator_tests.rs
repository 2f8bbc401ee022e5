//! Gating and settlement tests for the generation coordinator

use async_trait::async_trait;
use promptpress_core::client::{ApiError, ApiResult};
use promptpress_core::coordinator::{
    DocumentSnapshot, GenerationCoordinator, HostDocument, Outcome, RunPhase, TextGenerator,
};
use promptpress_core::request::PromptRequest;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct DocInner {
    content: Option<String>,
    has_run: bool,
}

/// Host document backed by shared state the test can inspect
#[derive(Debug, Clone, Default)]
struct TestDoc {
    inner: Arc<Mutex<DocInner>>,
}

impl TestDoc {
    fn already_ran() -> Self {
        let doc = Self::default();
        doc.inner.lock().unwrap().has_run = true;
        doc
    }

    fn content(&self) -> Option<String> {
        self.inner.lock().unwrap().content.clone()
    }

    fn latch(&self) -> bool {
        self.inner.lock().unwrap().has_run
    }
}

impl HostDocument for TestDoc {
    fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            text: "draft".to_string(),
            format: "post".to_string(),
        }
    }

    fn has_run(&self) -> bool {
        self.inner.lock().unwrap().has_run
    }

    fn write(&mut self, content: String, has_run: bool) {
        let mut inner = self.inner.lock().unwrap();
        inner.content = Some(content);
        inner.has_run = has_run;
    }
}

/// Generator that replays scripted results and counts calls
struct ScriptedGenerator {
    calls: Arc<AtomicUsize>,
    script: Mutex<VecDeque<ApiResult<Vec<String>>>>,
}

impl ScriptedGenerator {
    fn new(script: Vec<ApiResult<Vec<String>>>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: Arc::clone(&calls),
                script: Mutex::new(script.into()),
            },
            calls,
        )
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _request: &PromptRequest) -> ApiResult<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(vec![]))
    }
}

/// Generator that parks until the test releases it
struct BlockedGenerator {
    calls: Arc<AtomicUsize>,
    release: Arc<Notify>,
}

#[async_trait]
impl TextGenerator for BlockedGenerator {
    async fn generate(&self, _request: &PromptRequest) -> ApiResult<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.release.notified().await;
        Ok(vec!["slow".to_string()])
    }
}

#[tokio::test]
async fn test_success_writes_first_text_and_sets_latch() {
    let (generator, _calls) =
        ScriptedGenerator::new(vec![Ok(vec!["first".to_string(), "second".to_string()])]);
    let doc = TestDoc::default();
    let coordinator = GenerationCoordinator::new(generator, doc.clone());

    let outcome = coordinator.trigger().await;

    assert_eq!(outcome, Outcome::Generated);
    assert_eq!(doc.content(), Some("first".to_string()));
    assert!(doc.latch());
    assert!(coordinator.with_document(|d| d.has_run()));
    assert!(!coordinator.loading());
    assert_eq!(coordinator.phase(), RunPhase::Succeeded);
    assert_eq!(coordinator.last_error(), None);
}

#[tokio::test]
async fn test_latch_suppresses_any_request() {
    let (generator, calls) = ScriptedGenerator::new(vec![Ok(vec!["text".to_string()])]);
    let doc = TestDoc::already_ran();
    let coordinator = GenerationCoordinator::new(generator, doc.clone());

    let outcome = coordinator.trigger().await;

    assert_eq!(outcome, Outcome::AlreadyRan);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(doc.content(), None);
    assert!(!coordinator.loading());
    assert_eq!(coordinator.phase(), RunPhase::Idle);
}

#[tokio::test]
async fn test_second_trigger_while_loading_is_busy() {
    let release = Arc::new(Notify::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let generator = BlockedGenerator {
        calls: Arc::clone(&calls),
        release: Arc::clone(&release),
    };
    let doc = TestDoc::default();
    let coordinator = GenerationCoordinator::new(generator, doc.clone());

    let first = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.trigger().await })
    };

    // Wait until the first trigger holds the loading flag
    while !coordinator.loading() {
        tokio::task::yield_now().await;
    }

    let second = coordinator.trigger().await;
    assert_eq!(second, Outcome::Busy);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    release.notify_one();
    let first = first.await.expect("first trigger panicked");
    assert_eq!(first, Outcome::Generated);
    assert!(!coordinator.loading());
    assert_eq!(doc.content(), Some("slow".to_string()));
}

#[tokio::test]
async fn test_failure_leaves_document_and_latch_untouched() {
    let (generator, _calls) = ScriptedGenerator::new(vec![Err(ApiError::Transport(
        "connection reset".to_string(),
    ))]);
    let doc = TestDoc::default();
    let coordinator = GenerationCoordinator::new(generator, doc.clone());

    let outcome = coordinator.trigger().await;

    assert_eq!(outcome, Outcome::Failed);
    assert_eq!(doc.content(), None);
    assert!(!doc.latch());
    assert!(!coordinator.loading());
    assert_eq!(coordinator.phase(), RunPhase::Failed);
    let error = coordinator.last_error().expect("Expected surfaced error");
    assert!(error.contains("connection reset"));
}

#[tokio::test]
async fn test_failure_allows_retry() {
    let (generator, calls) = ScriptedGenerator::new(vec![
        Err(ApiError::Transport("first attempt".to_string())),
        Ok(vec!["recovered".to_string()]),
    ]);
    let doc = TestDoc::default();
    let coordinator = GenerationCoordinator::new(generator, doc.clone());

    assert_eq!(coordinator.trigger().await, Outcome::Failed);
    assert_eq!(coordinator.trigger().await, Outcome::Generated);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(doc.content(), Some("recovered".to_string()));
    assert!(doc.latch());
    assert_eq!(coordinator.last_error(), None);
}

#[tokio::test]
async fn test_empty_texts_is_a_failure() {
    let (generator, _calls) = ScriptedGenerator::new(vec![Ok(vec![])]);
    let doc = TestDoc::default();
    let coordinator = GenerationCoordinator::new(generator, doc.clone());

    let outcome = coordinator.trigger().await;

    assert_eq!(outcome, Outcome::Failed);
    assert_eq!(doc.content(), None);
    assert!(!doc.latch());
    assert!(coordinator.last_error().is_some());
}

#[tokio::test]
async fn test_success_after_success_is_gated_by_latch() {
    let (generator, calls) = ScriptedGenerator::new(vec![
        Ok(vec!["once".to_string()]),
        Ok(vec!["never".to_string()]),
    ]);
    let doc = TestDoc::default();
    let coordinator = GenerationCoordinator::new(generator, doc.clone());

    assert_eq!(coordinator.trigger().await, Outcome::Generated);
    assert_eq!(coordinator.trigger().await, Outcome::AlreadyRan);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(doc.content(), Some("once".to_string()));
}
