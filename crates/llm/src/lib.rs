//! MDAI chat-completion infrastructure adapter.
//!
//! Implements the [`pipeline::ChatCompletionClient`] trait for OpenAI-compatible
//! `/chat/completions` endpoints. Other providers are added as new types in
//! this crate without any changes to the `pipeline` or `operations` crates.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, request formatting, response parsing, the
//! request timeout, and error-body scrubbing live here. The [`pipeline`] crate
//! sees only [`pipeline::ChatCompletionClient`] and [`pipeline::CompletionError`].
//!
//! No retries are performed: every failure is returned to the caller as a single
//! [`pipeline::CompletionError`].

pub mod openai;
pub mod scrub;

pub use openai::{ClientBuildError, OpenAiChatClient};
