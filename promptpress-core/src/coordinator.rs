//! Coordination of a single in-editor generation action
//!
//! One coordinator instance drives one user-facing generation action:
//! `Idle -> Loading -> Succeeded | Failed`. Two guards gate the trigger. The
//! `has_run` latch lives in the host document (persisted with the content)
//! and permanently suppresses re-triggering once a generation succeeded. The
//! `loading` flag is the mutual-exclusion guard for the single allowed
//! in-flight request; check and set happen under one lock acquisition.
//!
//! The coordinator is the only place errors become user-visible state:
//! nothing below it swallows a failure, nothing above it needs to inspect
//! `ApiError` variants.

use crate::client::{ApiClient, ApiError, ApiResult};
use crate::request::PromptRequest;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Producer of generated texts
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Run one templated generation request
    async fn generate(&self, request: &PromptRequest) -> ApiResult<Vec<String>>;
}

#[async_trait]
impl TextGenerator for ApiClient {
    async fn generate(&self, request: &PromptRequest) -> ApiResult<Vec<String>> {
        self.prompt(request).await
    }
}

/// Input data read from the host document for one generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot {
    /// Source text the prompt is built from
    pub text: String,
    /// Destination format hint
    pub format: String,
}

/// Host-managed attributes the coordinator reads and writes
pub trait HostDocument: Send {
    /// Data the prompt request is built from
    fn snapshot(&self) -> DocumentSnapshot;

    /// One-shot latch persisted alongside the content
    fn has_run(&self) -> bool;

    /// Write generated content together with the latch, as one update
    fn write(&mut self, content: String, has_run: bool);
}

/// Lifecycle of one generation action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    /// Nothing triggered yet (or a failure was acknowledged)
    #[default]
    Idle,
    /// A request is in flight
    Loading,
    /// The last trigger wrote content into the document
    Succeeded,
    /// The last trigger settled with an error
    Failed,
}

/// What a trigger attempt did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A text was generated and written into the document
    Generated,
    /// The latch was already set; no request was sent
    AlreadyRan,
    /// A request was already in flight; no second request was sent
    Busy,
    /// The request settled with an error; the document is untouched
    Failed,
}

struct CoordState<D> {
    document: D,
    loading: bool,
    phase: RunPhase,
    last_error: Option<String>,
}

/// Drives one generation action against a host document
///
/// Cheap to clone; clones share the loading flag and the document, so
/// concurrent triggers from different handles still collapse to one request.
pub struct GenerationCoordinator<G, D> {
    generator: Arc<G>,
    state: Arc<Mutex<CoordState<D>>>,
}

impl<G, D> Clone for GenerationCoordinator<G, D> {
    fn clone(&self) -> Self {
        Self {
            generator: Arc::clone(&self.generator),
            state: Arc::clone(&self.state),
        }
    }
}

impl<G: TextGenerator, D: HostDocument> GenerationCoordinator<G, D> {
    /// Create a coordinator for one generation action
    pub fn new(generator: G, document: D) -> Self {
        Self {
            generator: Arc::new(generator),
            state: Arc::new(Mutex::new(CoordState {
                document,
                loading: false,
                phase: RunPhase::default(),
                last_error: None,
            })),
        }
    }

    /// Whether a request is currently in flight
    pub fn loading(&self) -> bool {
        self.state.lock().unwrap().loading
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> RunPhase {
        self.state.lock().unwrap().phase
    }

    /// User-visible message of the last failure, if any
    pub fn last_error(&self) -> Option<String> {
        self.state.lock().unwrap().last_error.clone()
    }

    /// Run a closure over the host document
    pub fn with_document<R>(&self, f: impl FnOnce(&D) -> R) -> R {
        f(&self.state.lock().unwrap().document)
    }

    /// Run the action once
    ///
    /// Gated triggers return without issuing any request. A settled trigger
    /// always leaves `loading` false, whatever the result.
    pub async fn trigger(&self) -> Outcome {
        // Check both guards and flip the loading flag under one lock
        // acquisition; no suspension point between check and set.
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            if state.document.has_run() {
                debug!("Trigger ignored: action already ran");
                return Outcome::AlreadyRan;
            }
            if state.loading {
                debug!("Trigger ignored: request already in flight");
                return Outcome::Busy;
            }
            state.loading = true;
            state.phase = RunPhase::Loading;
            state.last_error = None;
            state.document.snapshot()
        };

        let request = PromptRequest::new(snapshot.text, snapshot.format);
        let result = self.generator.generate(&request).await;

        let mut state = self.state.lock().unwrap();
        state.loading = false;
        match result {
            Ok(mut texts) if !texts.is_empty() => {
                state.document.write(texts.remove(0), true);
                state.phase = RunPhase::Succeeded;
                Outcome::Generated
            }
            Ok(_) => fail(
                &mut state,
                &ApiError::MalformedResponse("'texts' is empty".to_string()),
            ),
            Err(err) => fail(&mut state, &err),
        }
    }
}

fn fail<D>(state: &mut CoordState<D>, err: &ApiError) -> Outcome {
    warn!("Generation failed: {}", err);
    state.last_error = Some(err.to_string());
    state.phase = RunPhase::Failed;
    Outcome::Failed
}
