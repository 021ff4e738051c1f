//! Port traits.
//!
//! The operations crate depends only on these traits. Infrastructure crates
//! (`llm`, `vault`) and hosts (`cli`, tests) supply the implementations.
//!
//! All traits are object-safe via `async_trait` so hosts can hold them as
//! `Arc<dyn ...>`.

use async_trait::async_trait;

use crate::{
    ChatRequest, CompletionError, CompletionParameters, DocumentName, EditorError, StoreError,
};

/// Chat-completion service.
#[async_trait]
pub trait ChatCompletionClient: Send + Sync {
    /// Sends `request` and returns the text of the first choice.
    ///
    /// Implementations must not retry and must not return partial output.
    async fn complete(
        &self,
        request: &ChatRequest,
        parameters: &CompletionParameters,
    ) -> Result<String, CompletionError>;
}

/// Document store that persisting operations write into.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns `true` if a document named `name` exists.
    async fn exists(&self, name: &DocumentName) -> Result<bool, StoreError>;

    /// Creates a new document. Fails with [`StoreError::AlreadyExists`] rather
    /// than overwriting.
    async fn create(&self, name: &DocumentName, content: &str) -> Result<(), StoreError>;
}

/// The active document editing surface.
#[async_trait]
pub trait EditorSurface: Send + Sync {
    /// Full text of the document.
    fn value(&self) -> String;

    /// Currently selected text; empty when nothing is selected.
    fn selection(&self) -> String;

    /// Replaces the current selection with `text`.
    async fn replace_selection(&self, text: &str) -> Result<(), EditorError>;
}

/// Answer from an [`InputPrompt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResponse {
    Provided(String),
    /// The user dismissed the prompt without submitting.
    Cancelled,
}

/// Interactive single-line text prompt.
#[async_trait]
pub trait InputPrompt: Send + Sync {
    async fn prompt(&self, title: &str, placeholder: &str) -> PromptResponse;
}
