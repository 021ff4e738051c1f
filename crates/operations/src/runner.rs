//! The directive runner: the four operations as short state machines.

use std::sync::Arc;

use pipeline::templates::directive_payload;
use pipeline::{
    identify, ChatCompletionClient, ChatRequest, Configuration, DocumentName, DocumentStore,
    DuplicatePolicy, EditorSurface, InputPrompt, NoInputReason, OperationError, OperationId,
    StoreError, Timestamp,
};
use tracing::Instrument;

use crate::gather;
use crate::{OperationKind, OperationOutcome, OperationReport, OperationState};

/// Why a run stopped early, and where.
struct Abort {
    at: OperationState,
    error: OperationError,
}

/// Current state of one run; every transition is logged at debug level.
struct Progress {
    state: OperationState,
}

impl Progress {
    fn new() -> Self {
        Self {
            state: OperationState::Gathering,
        }
    }

    fn advance(&mut self, next: OperationState) {
        tracing::debug!(from = %self.state, to = %next, "operation state transition");
        self.state = next;
    }

    fn abort(&self, error: impl Into<OperationError>) -> Abort {
        Abort {
            at: self.state,
            error: error.into(),
        }
    }

    fn no_input(&self, reason: NoInputReason) -> Abort {
        self.abort(OperationError::no_input(reason))
    }
}

/// Runs directive operations against a completion client and a document store.
///
/// The runner holds no configuration: every call takes the snapshot it should
/// use, so settings edits only affect operations started afterwards. Runs are
/// independent and may overlap; nothing orders their writes.
#[derive(Clone)]
pub struct DirectiveRunner {
    completion: Arc<dyn ChatCompletionClient>,
    store: Arc<dyn DocumentStore>,
}

impl DirectiveRunner {
    pub fn new(completion: Arc<dyn ChatCompletionClient>, store: Arc<dyn DocumentStore>) -> Self {
        Self { completion, store }
    }

    /// Completes the full document and persists the result as `<cid>.md`.
    pub async fn execute_directive(
        &self,
        config: &Configuration,
        editor: Option<&dyn EditorSurface>,
    ) -> OperationReport {
        self.run(OperationKind::ExecuteDirective, async {
            let mut progress = Progress::new();
            let payload = gather::full_document(editor).map_err(|r| progress.no_input(r))?;
            self.complete_and_persist(config, payload, &mut progress)
                .await
        })
        .await
    }

    /// Completes the document plus one prompted line and persists the result.
    ///
    /// A cancelled prompt aborts before any network call.
    pub async fn execute_with_input(
        &self,
        config: &Configuration,
        editor: Option<&dyn EditorSurface>,
        prompt: &dyn InputPrompt,
    ) -> OperationReport {
        self.run(OperationKind::ExecuteWithInput, async {
            let mut progress = Progress::new();
            let payload = gather::document_with_input(editor, prompt)
                .await
                .map_err(|r| progress.no_input(r))?;
            self.complete_and_persist(config, payload, &mut progress)
                .await
        })
        .await
    }

    /// Places the selection (or the document) behind the directive template,
    /// completes it, and persists the generated directive.
    pub async fn generate_directive(
        &self,
        config: &Configuration,
        editor: Option<&dyn EditorSurface>,
    ) -> OperationReport {
        self.run(OperationKind::GenerateDirective, async {
            let mut progress = Progress::new();
            let task = gather::selection_or_document(editor).map_err(|r| progress.no_input(r))?;
            let payload = directive_payload(&config.directive_generator_template, &task);
            self.complete_and_persist(config, payload, &mut progress)
                .await
        })
        .await
    }

    /// Completes the selection and replaces it in place. Never creates a document.
    pub async fn complete_in_place(
        &self,
        config: &Configuration,
        editor: Option<&dyn EditorSurface>,
    ) -> OperationReport {
        self.run(OperationKind::CompleteInPlace, async {
            let mut progress = Progress::new();
            let payload = gather::selection_only(editor).map_err(|r| progress.no_input(r))?;
            let editor = editor.ok_or_else(|| progress.no_input(NoInputReason::NoActiveEditor))?;
            let response = self.complete(config, payload, &mut progress).await?;

            progress.advance(OperationState::Replacing);
            editor
                .replace_selection(&response)
                .await
                .map_err(|e| progress.abort(e))?;
            Ok(OperationOutcome::Replaced {
                replacement_chars: response.chars().count(),
            })
        })
        .await
    }

    // -----------------------------------------------------------------------

    async fn run<F>(&self, kind: OperationKind, body: F) -> OperationReport
    where
        F: std::future::Future<Output = Result<OperationOutcome, Abort>>,
    {
        let id = OperationId::new_random();
        let span = tracing::info_span!("operation", operation = %kind, operation_id = %id);

        async move {
            let started_at = Timestamp::now();
            let outcome = match body.await {
                Ok(outcome) => {
                    log_success(&outcome);
                    outcome
                }
                Err(Abort { at, error }) => {
                    log_abort(at, &error);
                    OperationOutcome::Aborted { at, error }
                }
            };
            OperationReport {
                id,
                kind,
                started_at,
                finished_at: Timestamp::now(),
                outcome,
            }
        }
        .instrument(span)
        .await
    }

    async fn complete(
        &self,
        config: &Configuration,
        payload: String,
        progress: &mut Progress,
    ) -> Result<String, Abort> {
        progress.advance(OperationState::Completing);
        let parameters = config.completion_parameters();
        let request = ChatRequest::framed(payload);
        tracing::info!(
            model = %parameters.model,
            temperature = %parameters.temperature,
            payload_chars = request.payload().chars().count(),
            "requesting completion"
        );
        self.completion
            .complete(&request, &parameters)
            .await
            .map_err(|e| progress.abort(e))
    }

    async fn complete_and_persist(
        &self,
        config: &Configuration,
        payload: String,
        progress: &mut Progress,
    ) -> Result<OperationOutcome, Abort> {
        let response = self.complete(config, payload, progress).await?;

        progress.advance(OperationState::Addressing);
        let identifier = identify(&response);
        let document = DocumentName::for_identifier(&identifier);

        progress.advance(OperationState::Persisting);
        if config.duplicate_policy == DuplicatePolicy::Reuse
            && self
                .store
                .exists(&document)
                .await
                .map_err(|e| progress.abort(e))?
        {
            return Ok(OperationOutcome::Reused {
                identifier,
                document,
            });
        }

        match self.store.create(&document, &response).await {
            Ok(()) => Ok(OperationOutcome::Persisted {
                identifier,
                document,
            }),
            Err(StoreError::AlreadyExists { name }) if config.duplicate_policy == DuplicatePolicy::Reuse => {
                // Lost a race with a concurrent run that wrote the same content.
                Ok(OperationOutcome::Reused {
                    identifier,
                    document: name,
                })
            }
            Err(e) => Err(progress.abort(e)),
        }
    }
}

fn log_success(outcome: &OperationOutcome) {
    match outcome {
        OperationOutcome::Persisted {
            identifier,
            document,
        } => tracing::info!(%identifier, %document, "document created"),
        OperationOutcome::Reused {
            identifier,
            document,
        } => tracing::info!(%identifier, %document, "document already exists, reused"),
        OperationOutcome::Replaced { replacement_chars } => {
            tracing::info!(replacement_chars, "selection replaced");
        }
        OperationOutcome::Aborted { .. } => {}
    }
}

fn log_abort(at: OperationState, error: &OperationError) {
    match error {
        OperationError::NoActiveInput { reason } => {
            tracing::info!(state = %at, %reason, "nothing to do, operation aborted");
        }
        other => {
            tracing::error!(
                state = %at,
                error_kind = other.kind(),
                error = %other,
                "operation aborted"
            );
        }
    }
}
