//! Newtype domain identifiers.
//!
//! Every domain concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally passing a model name where a
//! document name is expected even though both are strings under the hood.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub(crate) String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed (configuration / storage names)
// ---------------------------------------------------------------------------

string_id! {
    /// Name of the chat-completion model to invoke (e.g. `"gpt-4"`).
    ModelName
}

string_id! {
    /// Name of a document in the document store, including its extension.
    ///
    /// Persisting operations always derive this from a [`ContentIdentifier`]
    /// via [`DocumentName::for_identifier`].
    DocumentName
}

/// File extension appended to every content-addressed document name.
pub const DOCUMENT_EXTENSION: &str = "md";

impl DocumentName {
    /// Returns the document name `<identifier>.md`.
    pub fn for_identifier(identifier: &ContentIdentifier) -> Self {
        Self(format!("{}.{DOCUMENT_EXTENSION}", identifier.as_str()))
    }
}

// ---------------------------------------------------------------------------
// Content identifier
// ---------------------------------------------------------------------------

/// Deterministic, self-describing identifier derived from content bytes.
///
/// Only [`crate::addressing::identify`] constructs values of this type, so every
/// instance is the canonical multibase rendering of a CIDv1.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentIdentifier(String);

impl ContentIdentifier {
    pub(crate) fn from_canonical(rendered: String) -> Self {
        Self(rendered)
    }

    /// Returns the canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// API credential for the chat-completion service.
///
/// `Debug` never prints the secret; use [`ApiKey::masked`] for display.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    /// Returns the raw secret. Only transport adapters should call this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a display-safe rendering that keeps at most the last four characters.
    pub fn masked(&self) -> String {
        if self.0.is_empty() {
            return "(not set)".to_string();
        }
        let tail: String = self
            .0
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        if self.0.chars().count() <= 8 {
            "****".to_string()
        } else {
            format!("****{tail}")
        }
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ApiKey").field(&"[REDACTED]").finish()
    }
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single operation run (one invocation of a user command).
///
/// Generated fresh for every operation; recorded on the operation span and in
/// the returned report so all activity from a single run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationId(Uuid);

impl OperationId {
    /// Generates a new random operation identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addressing::identify;

    #[test]
    fn string_ids_reject_empty_values() {
        assert!(ModelName::new("").is_none());
        assert_eq!(ModelName::new("gpt-4").unwrap().as_str(), "gpt-4");
        assert!(DocumentName::new("").is_none());
    }

    #[test]
    fn document_name_appends_markdown_extension() {
        let id = identify("hello world");
        let name = DocumentName::for_identifier(&id);
        assert_eq!(name.as_str(), format!("{id}.md"));
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::new("sk-proj-abcdefgh12345678");
        let debug = format!("{key:?}");
        assert!(!debug.contains("sk-proj"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn api_key_masking_keeps_only_the_tail() {
        assert_eq!(ApiKey::new("").masked(), "(not set)");
        assert_eq!(ApiKey::new("short").masked(), "****");
        assert_eq!(ApiKey::new("sk-proj-abcdefgh1234").masked(), "****1234");
    }

    #[test]
    fn api_key_trims_surrounding_whitespace() {
        let key = ApiKey::new("  sk-test\n");
        assert_eq!(key.expose(), "sk-test");
    }

    #[test]
    fn operation_ids_are_unique() {
        assert_ne!(OperationId::new_random(), OperationId::new_random());
    }
}
