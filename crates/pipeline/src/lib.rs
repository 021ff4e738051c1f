//! Core domain for MDAI directive execution.
//!
//! This crate contains every domain concept, newtype identifier, shared value
//! type, and error type used by the directive pipeline. Infrastructure crates
//! implement the port traits defined here; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`ContentIdentifier`, `DocumentName`, etc.) |
//! | [`types`] | Value types (`Temperature`, `ChatMessage`, `ChatRequest`, etc.) |
//! | [`addressing`] | Content addresser: bytes to CIDv1 identifier |
//! | [`templates`] | Fixed conversational framing and the directive generator |
//! | [`config`] | User configuration, defaults merge, and settings updates |
//! | [`errors`] | Error taxonomy for completions, persistence, and operations |
//! | [`ports`] | Traits implemented by infrastructure and host adapters |

pub mod addressing;
pub mod config;
pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod templates;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use addressing::identify;
pub use config::{Configuration, DuplicatePolicy, SettingsUpdate};
pub use errors::{
    CompletionError, CompletionFailureKind, ConfigurationError, EditorError, NoInputReason,
    OperationError, StoreError,
};
pub use identifiers::{ApiKey, ContentIdentifier, DocumentName, ModelName, OperationId};
pub use ports::{ChatCompletionClient, DocumentStore, EditorSurface, InputPrompt, PromptResponse};
pub use types::{ChatMessage, ChatRequest, ChatRole, CompletionParameters, Temperature, Timestamp};
