//! User configuration.
//!
//! A [`Configuration`] is an immutable snapshot. It is loaded once, merged over
//! [`Configuration::default`], and passed explicitly into every operation.
//! Edits go through [`Configuration::apply`], which returns a new snapshot and
//! leaves the original untouched.
//!
//! The persisted form is a JSON object with camelCase keys. Keys missing from
//! the blob take their default value; unknown keys are ignored.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::templates::DIRECTIVE_GENERATOR;
use crate::{ApiKey, CompletionParameters, ConfigurationError, ModelName, Temperature};

pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_TEMPERATURE: f64 = 0.8;
pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

// ---------------------------------------------------------------------------

/// What a persisting operation does when a document with the computed
/// identifier already exists.
///
/// The model is invoked either way: the identifier is derived from the
/// response, which is unknown until the call returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Attempt the write and let the store reject the duplicate; the operation aborts.
    #[default]
    Reject,
    /// Skip the write and report the existing document. Equal identifiers mean
    /// byte-identical content, so nothing is lost.
    Reuse,
}

impl FromStr for DuplicatePolicy {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "reuse" => Ok(Self::Reuse),
            other => Err(ConfigurationError::InvalidValue {
                key: "duplicate-policy".to_string(),
                message: format!("expected 'reject' or 'reuse', got '{other}'"),
            }),
        }
    }
}

impl std::fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reject => f.write_str("reject"),
            Self::Reuse => f.write_str("reuse"),
        }
    }
}

// ---------------------------------------------------------------------------

/// User configuration for the directive pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Configuration {
    /// Credential for the chat-completion service.
    pub api_key: ApiKey,

    /// Model requested on every completion.
    pub model: ModelName,

    /// Sampling temperature requested on every completion.
    pub temperature: Temperature,

    /// Meta-template placed ahead of the task text by "generate directive".
    #[serde(rename = "directiveGenerator")]
    pub directive_generator_template: String,

    /// Root of the OpenAI-compatible API (`/chat/completions` is appended).
    pub api_base_url: String,

    /// Upper bound on a single completion call, in seconds.
    pub request_timeout_secs: u64,

    /// Behaviour when a persisting operation produces an existing identifier.
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            api_key: ApiKey::default(),
            model: ModelName(DEFAULT_MODEL.to_string()),
            temperature: Temperature(DEFAULT_TEMPERATURE),
            directive_generator_template: DIRECTIVE_GENERATOR.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

impl Configuration {
    /// Parses a persisted settings blob and merges it over the defaults.
    ///
    /// An empty or whitespace-only blob yields the defaults.
    pub fn from_json(blob: &str) -> Result<Self, ConfigurationError> {
        if blob.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_json::from_str(blob).map_err(|e| ConfigurationError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`Configuration::from_json`], but a field that fails to parse or
    /// validate keeps its default instead of failing the whole blob.
    ///
    /// Returns the configuration together with each rejected key and why it
    /// was rejected. Only a blob that is not a JSON object is an error.
    pub fn from_json_lenient(
        blob: &str,
    ) -> Result<(Self, Vec<(String, ConfigurationError)>), ConfigurationError> {
        if blob.trim().is_empty() {
            return Ok((Self::default(), Vec::new()));
        }
        let fields: serde_json::Map<String, serde_json::Value> = serde_json::from_str(blob)
            .map_err(|e| ConfigurationError::Parse {
                message: e.to_string(),
            })?;

        let mut accepted = serde_json::Map::new();
        let mut rejected = Vec::new();
        for (key, value) in fields {
            accepted.insert(key.clone(), value);
            if let Err(e) = Self::from_fields(&accepted) {
                accepted.remove(&key);
                rejected.push((key, e));
            }
        }
        Ok((Self::from_fields(&accepted)?, rejected))
    }

    fn from_fields(
        fields: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, ConfigurationError> {
        let config: Self = serde_json::from_value(serde_json::Value::Object(fields.clone()))
            .map_err(|e| ConfigurationError::Parse {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Renders the persisted settings blob.
    pub fn to_json(&self) -> Result<String, ConfigurationError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigurationError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks the invariants that serde alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.model.as_str().trim().is_empty() {
            return Err(ConfigurationError::EmptyModel);
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigurationError::InvalidTimeout);
        }
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(ConfigurationError::InvalidBaseUrl {
                value: self.api_base_url.clone(),
            });
        }
        Ok(())
    }

    /// Model and temperature for a completion dispatched now.
    pub fn completion_parameters(&self) -> CompletionParameters {
        CompletionParameters {
            model: self.model.clone(),
            temperature: self.temperature,
        }
    }

    /// Returns a new snapshot with `update` applied.
    pub fn apply(&self, update: SettingsUpdate) -> Result<Self, ConfigurationError> {
        let setting = update.key();
        let mut next = self.clone();
        match update {
            SettingsUpdate::ApiKey(key) => next.api_key = key,
            SettingsUpdate::Model(model) => next.model = model,
            SettingsUpdate::Temperature(temperature) => next.temperature = temperature,
            SettingsUpdate::DirectiveTemplate(template) => {
                next.directive_generator_template = template;
            }
            SettingsUpdate::ResetDirectiveTemplate => {
                next.directive_generator_template = DIRECTIVE_GENERATOR.to_string();
            }
            SettingsUpdate::ApiBaseUrl(url) => {
                next.api_base_url = url.trim_end_matches('/').to_string();
            }
            SettingsUpdate::RequestTimeoutSecs(secs) => next.request_timeout_secs = secs,
            SettingsUpdate::DuplicatePolicy(policy) => next.duplicate_policy = policy,
        }
        next.validate()?;
        tracing::debug!(setting, "settings updated");
        Ok(next)
    }
}

// ---------------------------------------------------------------------------

/// A single user edit to the configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsUpdate {
    ApiKey(ApiKey),
    Model(ModelName),
    Temperature(Temperature),
    DirectiveTemplate(String),
    ResetDirectiveTemplate,
    ApiBaseUrl(String),
    RequestTimeoutSecs(u64),
    DuplicatePolicy(DuplicatePolicy),
}

impl SettingsUpdate {
    /// Keys accepted by [`SettingsUpdate::parse`].
    pub const KEYS: [&'static str; 7] = [
        "api-key",
        "model",
        "temperature",
        "directive-template",
        "api-base-url",
        "request-timeout-secs",
        "duplicate-policy",
    ];

    /// Settings key this update edits.
    pub fn key(&self) -> &'static str {
        match self {
            Self::ApiKey(_) => "api-key",
            Self::Model(_) => "model",
            Self::Temperature(_) => "temperature",
            Self::DirectiveTemplate(_) | Self::ResetDirectiveTemplate => "directive-template",
            Self::ApiBaseUrl(_) => "api-base-url",
            Self::RequestTimeoutSecs(_) => "request-timeout-secs",
            Self::DuplicatePolicy(_) => "duplicate-policy",
        }
    }

    /// Parses a `key = value` edit as typed on a settings surface.
    pub fn parse(key: &str, value: &str) -> Result<Self, ConfigurationError> {
        let invalid = |message: String| ConfigurationError::InvalidValue {
            key: key.to_string(),
            message,
        };
        match key {
            "api-key" => Ok(Self::ApiKey(ApiKey::new(value))),
            "model" => ModelName::new(value.trim())
                .map(Self::Model)
                .ok_or(ConfigurationError::EmptyModel),
            "temperature" => {
                let parsed: f64 = value
                    .trim()
                    .parse()
                    .map_err(|e: std::num::ParseFloatError| invalid(e.to_string()))?;
                Ok(Self::Temperature(Temperature::try_from(parsed)?))
            }
            "directive-template" => Ok(Self::DirectiveTemplate(value.to_string())),
            "api-base-url" => Ok(Self::ApiBaseUrl(value.trim().to_string())),
            "request-timeout-secs" => value
                .trim()
                .parse()
                .map(Self::RequestTimeoutSecs)
                .map_err(|e: std::num::ParseIntError| invalid(e.to_string())),
            "duplicate-policy" => value.parse().map(Self::DuplicatePolicy),
            other => Err(ConfigurationError::UnknownSetting {
                key: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_settings() {
        let config = Configuration::default();
        assert!(config.api_key.is_empty());
        assert_eq!(config.model.as_str(), "gpt-4");
        assert_eq!(config.temperature.as_f64(), 0.8);
        assert_eq!(config.directive_generator_template, DIRECTIVE_GENERATOR);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_blob_yields_defaults() {
        assert_eq!(Configuration::from_json("").unwrap(), Configuration::default());
        assert_eq!(Configuration::from_json("{}").unwrap(), Configuration::default());
    }

    #[test]
    fn present_fields_override_and_missing_fields_fall_back() {
        let config =
            Configuration::from_json(r#"{"apiKey":"sk-abc","model":"gpt-4o","temperature":0.2}"#)
                .unwrap();
        assert_eq!(config.api_key.expose(), "sk-abc");
        assert_eq!(config.model.as_str(), "gpt-4o");
        assert_eq!(config.temperature.as_f64(), 0.2);
        assert_eq!(config.directive_generator_template, DIRECTIVE_GENERATOR);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn directive_generator_blob_key_is_honoured() {
        let config = Configuration::from_json(r#"{"directiveGenerator":"custom"}"#).unwrap();
        assert_eq!(config.directive_generator_template, "custom");
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let config = Configuration::from_json(r#"{"legacyFlag":true,"model":"m"}"#).unwrap();
        assert_eq!(config.model.as_str(), "m");
    }

    #[test]
    fn invalid_blobs_are_rejected() {
        assert!(matches!(
            Configuration::from_json(r#"{"temperature":2.0}"#),
            Err(ConfigurationError::Parse { .. })
        ));
        assert!(matches!(
            Configuration::from_json(r#"{"model":""}"#),
            Err(ConfigurationError::EmptyModel)
        ));
        assert!(matches!(
            Configuration::from_json(r#"{"requestTimeoutSecs":0}"#),
            Err(ConfigurationError::InvalidTimeout)
        ));
        assert!(matches!(
            Configuration::from_json("not json"),
            Err(ConfigurationError::Parse { .. })
        ));
    }

    #[test]
    fn lenient_parse_keeps_valid_fields_and_reports_the_rest() {
        let (config, rejected) = Configuration::from_json_lenient(
            r#"{"model":"gpt-4o","temperature":3.5,"requestTimeoutSecs":0,"apiKey":"sk-1"}"#,
        )
        .unwrap();

        assert_eq!(config.model.as_str(), "gpt-4o");
        assert_eq!(config.api_key.expose(), "sk-1");
        assert_eq!(config.temperature.as_f64(), DEFAULT_TEMPERATURE);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);

        let keys: Vec<&str> = rejected.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&"temperature"));
        assert!(keys.contains(&"requestTimeoutSecs"));
    }

    #[test]
    fn lenient_parse_still_rejects_non_objects() {
        assert!(matches!(
            Configuration::from_json_lenient("not json"),
            Err(ConfigurationError::Parse { .. })
        ));
        assert!(Configuration::from_json_lenient("[1, 2]").is_err());
        assert_eq!(
            Configuration::from_json_lenient("").unwrap().0,
            Configuration::default()
        );
    }

    #[test]
    fn json_round_trip_uses_camel_case_keys() {
        let json = Configuration::default().to_json().unwrap();
        assert!(json.contains("\"apiKey\""));
        assert!(json.contains("\"directiveGenerator\""));
        assert!(json.contains("\"duplicatePolicy\": \"reject\""));
        assert_eq!(Configuration::from_json(&json).unwrap(), Configuration::default());
    }

    #[test]
    fn apply_returns_new_snapshot_and_leaves_original() {
        let original = Configuration::default();
        let updated = original
            .apply(SettingsUpdate::Model(ModelName::new("gpt-4o-mini").unwrap()))
            .unwrap();
        assert_eq!(original.model.as_str(), "gpt-4");
        assert_eq!(updated.model.as_str(), "gpt-4o-mini");
    }

    #[test]
    fn apply_validates_result() {
        let original = Configuration::default();
        assert!(matches!(
            original.apply(SettingsUpdate::RequestTimeoutSecs(0)),
            Err(ConfigurationError::InvalidTimeout)
        ));
        assert!(matches!(
            original.apply(SettingsUpdate::ApiBaseUrl("ftp://x".into())),
            Err(ConfigurationError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn reset_template_restores_default() {
        let custom = Configuration::default()
            .apply(SettingsUpdate::DirectiveTemplate("mine".into()))
            .unwrap();
        let reset = custom.apply(SettingsUpdate::ResetDirectiveTemplate).unwrap();
        assert_eq!(reset.directive_generator_template, DIRECTIVE_GENERATOR);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = Configuration::default()
            .apply(SettingsUpdate::ApiBaseUrl("http://localhost:8080/v1/".into()))
            .unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn parse_accepts_every_documented_key() {
        let values = ["sk-1", "gpt-4o", "0.5", "tmpl", "https://x", "30", "reuse"];
        for (key, value) in SettingsUpdate::KEYS.iter().zip(values) {
            assert!(SettingsUpdate::parse(key, value).is_ok(), "key {key}");
        }
    }

    #[test]
    fn parse_rejects_bad_values() {
        assert!(matches!(
            SettingsUpdate::parse("temperature", "1.5"),
            Err(ConfigurationError::TemperatureOutOfRange { .. })
        ));
        assert!(matches!(
            SettingsUpdate::parse("temperature", "warm"),
            Err(ConfigurationError::InvalidValue { .. })
        ));
        assert!(matches!(
            SettingsUpdate::parse("model", "  "),
            Err(ConfigurationError::EmptyModel)
        ));
        assert!(matches!(
            SettingsUpdate::parse("duplicate-policy", "overwrite"),
            Err(ConfigurationError::InvalidValue { .. })
        ));
        assert!(matches!(
            SettingsUpdate::parse("colour", "blue"),
            Err(ConfigurationError::UnknownSetting { .. })
        ));
    }
}
