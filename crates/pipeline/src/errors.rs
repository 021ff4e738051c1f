//! Error taxonomy for the directive pipeline.
//!
//! Port-level errors ([`CompletionError`], [`StoreError`], [`EditorError`]) are
//! produced by infrastructure adapters. [`OperationError`] is what an operation
//! reports when it ends in the aborted state; it wraps the port error that
//! caused the abort, or says why there was nothing to do.
//!
//! None of these are retried locally.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::DocumentName;

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Coarse classification of a completion failure, used for logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionFailureKind {
    /// The request never produced an HTTP response (DNS, TLS, timeout, ...).
    Transport,
    /// The service rejected the credential (401/403) or none was configured.
    Authentication,
    /// The service answered with any other non-success status.
    Service,
    /// The response body could not be decoded or had no first choice.
    MalformedResponse,
}

impl std::fmt::Display for CompletionFailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Transport => "transport",
            Self::Authentication => "authentication",
            Self::Service => "service",
            Self::MalformedResponse => "malformed response",
        };
        f.write_str(label)
    }
}

/// The single "completion failed" condition, carrying the underlying cause.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Completion failed ({kind}): {cause}")]
pub struct CompletionError {
    pub kind: CompletionFailureKind,
    /// Human-readable cause, already scrubbed of credentials by the adapter.
    pub cause: String,
}

impl CompletionError {
    pub fn new(kind: CompletionFailureKind, cause: impl Into<String>) -> Self {
        Self {
            kind,
            cause: cause.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Errors returned by a [`crate::DocumentStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum StoreError {
    /// A document with this name already exists; nothing was written.
    #[error("Document '{name}' already exists")]
    AlreadyExists { name: DocumentName },

    /// The name cannot be stored by this backend (e.g. contains a path separator).
    #[error("Invalid document name '{name}'")]
    InvalidName { name: String },

    /// Any other backend failure.
    #[error("Document store failure: {message}")]
    Backend { message: String },
}

/// Errors returned by an [`crate::EditorSurface`].
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum EditorError {
    /// There is no selection to replace.
    #[error("No selection to replace")]
    NoSelection,

    /// The requested selection does not fit the document.
    #[error("Invalid selection: {message}")]
    InvalidSelection { message: String },

    /// The host could not apply the edit.
    #[error("Editor failure: {message}")]
    Backend { message: String },
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Why an operation found nothing to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoInputReason {
    NoActiveEditor,
    EmptyDocument,
    EmptySelection,
    PromptCancelled,
}

impl std::fmt::Display for NoInputReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::NoActiveEditor => "no active editor",
            Self::EmptyDocument => "document is empty",
            Self::EmptySelection => "selection is empty",
            Self::PromptCancelled => "input prompt was cancelled",
        };
        f.write_str(label)
    }
}

/// Why an operation ended in the aborted state.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum OperationError {
    /// Nothing to operate on. Neither the completion client nor the document
    /// store was called.
    #[error("No active input: {reason}")]
    NoActiveInput { reason: NoInputReason },

    /// The completion call failed. Nothing was created or altered.
    #[error(transparent)]
    CompletionFailure(#[from] CompletionError),

    /// The document store rejected the write. The completion was already spent.
    #[error("Persistence failed: {0}")]
    PersistenceFailure(#[from] StoreError),

    /// The editor rejected the in-place replacement. The completion was already spent.
    #[error("Replacement failed: {0}")]
    ReplacementFailure(#[from] EditorError),
}

impl OperationError {
    pub fn no_input(reason: NoInputReason) -> Self {
        Self::NoActiveInput { reason }
    }

    /// Stable snake_case label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoActiveInput { .. } => "no_active_input",
            Self::CompletionFailure(_) => "completion_failure",
            Self::PersistenceFailure(_) => "persistence_failure",
            Self::ReplacementFailure(_) => "replacement_failure",
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// The configuration or a settings edit is invalid.
///
/// Produced at load or edit time; an operation never starts with an invalid
/// configuration.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum ConfigurationError {
    #[error("Temperature {value} is outside [0, 1]")]
    TemperatureOutOfRange { value: f64 },

    #[error("Model name must not be empty")]
    EmptyModel,

    #[error("Request timeout must be at least one second")]
    InvalidTimeout,

    #[error("API base URL must start with http:// or https://, got '{value}'")]
    InvalidBaseUrl { value: String },

    #[error("Unknown setting '{key}'")]
    UnknownSetting { key: String },

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Settings could not be parsed: {message}")]
    Parse { message: String },
}
