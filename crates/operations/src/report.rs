//! Typed operation outcomes.

use pipeline::{ContentIdentifier, DocumentName, OperationError, OperationId, Timestamp};
use serde::Serialize;

/// The four user-facing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    ExecuteDirective,
    ExecuteWithInput,
    GenerateDirective,
    CompleteInPlace,
}

impl OperationKind {
    /// Command name on the host's command surface.
    pub fn command_name(self) -> &'static str {
        match self {
            Self::ExecuteDirective => "execute-directive",
            Self::ExecuteWithInput => "execute-directive-with-input",
            Self::GenerateDirective => "generate-directive",
            Self::CompleteInPlace => "complete-in-place",
        }
    }

    /// Whether the operation writes a new content-addressed document.
    pub fn is_persisting(self) -> bool {
        !matches!(self, Self::CompleteInPlace)
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.command_name())
    }
}

/// States an operation moves through.
///
/// `Gathering -> Completing -> (Addressing ->) Persisting | Replacing -> Done`,
/// or `Aborted` from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationState {
    Gathering,
    Completing,
    Addressing,
    Persisting,
    Replacing,
    Done,
    Aborted,
}

impl std::fmt::Display for OperationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Gathering => "gathering",
            Self::Completing => "completing",
            Self::Addressing => "addressing",
            Self::Persisting => "persisting",
            Self::Replacing => "replacing",
            Self::Done => "done",
            Self::Aborted => "aborted",
        };
        f.write_str(label)
    }
}

/// How an operation ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OperationOutcome {
    /// A new document was written.
    Persisted {
        identifier: ContentIdentifier,
        document: DocumentName,
    },
    /// A document with the same identifier already existed and was kept as-is.
    Reused {
        identifier: ContentIdentifier,
        document: DocumentName,
    },
    /// The selection was replaced with the completion.
    Replaced { replacement_chars: usize },
    /// The operation stopped in state `at` without finishing.
    Aborted {
        at: OperationState,
        error: OperationError,
    },
}

/// Result of one operation run, returned to the host instead of raising.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationReport {
    pub id: OperationId,
    pub kind: OperationKind,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
    pub outcome: OperationOutcome,
}

impl OperationReport {
    pub fn is_success(&self) -> bool {
        !matches!(self.outcome, OperationOutcome::Aborted { .. })
    }

    /// Terminal state: [`OperationState::Done`] or [`OperationState::Aborted`].
    pub fn final_state(&self) -> OperationState {
        if self.is_success() {
            OperationState::Done
        } else {
            OperationState::Aborted
        }
    }

    pub fn error(&self) -> Option<&OperationError> {
        match &self.outcome {
            OperationOutcome::Aborted { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Document written or reused by a persisting operation.
    pub fn document(&self) -> Option<&DocumentName> {
        match &self.outcome {
            OperationOutcome::Persisted { document, .. }
            | OperationOutcome::Reused { document, .. } => Some(document),
            _ => None,
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.finished_at.millis_since(self.started_at)
    }
}
