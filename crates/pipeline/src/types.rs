//! Shared value types for the directive pipeline.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values with invariants (e.g. temperatures are in `[0.0, 1.0]`, a
//! chat request always has exactly three messages).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::templates::{SYSTEM_FRAMING, TASK_FRAMING};
use crate::{ConfigurationError, ModelName};

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// A sampling temperature in the range `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Temperature(pub(crate) f64);

impl Temperature {
    /// Creates a [`Temperature`], returning `None` if `value` is outside
    /// the valid range `[0.0, 1.0]`.
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Returns the temperature as an `f64` in `[0.0, 1.0]`.
    pub fn as_f64(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Temperature {
    type Error = ConfigurationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(ConfigurationError::TemperatureOutOfRange { value })
    }
}

impl From<Temperature> for f64 {
    fn from(value: Temperature) -> Self {
        value.0
    }
}

impl std::fmt::Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Model and sampling settings for one completion call.
///
/// Taken from a [`crate::Configuration`] snapshot when the call is dispatched;
/// later settings edits never affect a call already in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionParameters {
    pub model: ModelName,
    pub temperature: Temperature,
}

// ---------------------------------------------------------------------------
// Chat messages
// ---------------------------------------------------------------------------

/// Role of a message in a chat-completion conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
}

impl ChatRole {
    /// Wire name of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
        }
    }
}

/// A single role-tagged message. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    role: ChatRole,
    content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn role(&self) -> ChatRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

// ---------------------------------------------------------------------------

/// The conversation sent for every completion.
///
/// Always exactly three messages, in this order:
///
/// 1. system: [`SYSTEM_FRAMING`]
/// 2. user: [`TASK_FRAMING`]
/// 3. user: the caller's payload, verbatim
///
/// The order defines instruction precedence. The fields are private so no
/// caller can reorder, drop, or add messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    messages: [ChatMessage; 3],
}

impl ChatRequest {
    /// Frames `payload` with the fixed system and task messages.
    pub fn framed(payload: impl Into<String>) -> Self {
        Self {
            messages: [
                ChatMessage::system(SYSTEM_FRAMING),
                ChatMessage::user(TASK_FRAMING),
                ChatMessage::user(payload),
            ],
        }
    }

    pub fn messages(&self) -> &[ChatMessage; 3] {
        &self.messages
    }

    /// The caller-supplied payload (the third message).
    pub fn payload(&self) -> &str {
        self.messages[2].content()
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }

    /// Milliseconds elapsed from `earlier` to `self`, clamped at zero.
    pub fn millis_since(self, earlier: Timestamp) -> u64 {
        u64::try_from((self.0 - earlier.0).num_milliseconds()).unwrap_or(0)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
