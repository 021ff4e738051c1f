//! OpenAI-compatible chat-completion client.

use std::time::Duration;

use async_trait::async_trait;
use pipeline::{
    ApiKey, ChatCompletionClient, ChatRequest, CompletionError, CompletionFailureKind,
    CompletionParameters, Configuration,
};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scrub::sanitize_error_body;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// The HTTP client could not be constructed.
#[derive(Debug, Error)]
#[error("HTTP client could not be built: {0}")]
pub struct ClientBuildError(#[from] reqwest::Error);

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
}

#[derive(Debug, Deserialize)]
struct WireResponseMessage {
    content: Option<String>,
}

// ---------------------------------------------------------------------------

/// Chat-completion client for `POST {base_url}/chat/completions`.
pub struct OpenAiChatClient {
    /// Pre-computed `"Bearer <key>"` header value; `None` when no key is configured.
    auth_header: Option<String>,
    endpoint: String,
    client: Client,
}

impl OpenAiChatClient {
    /// Creates a client for `base_url` with the given credential and timeout.
    pub fn new(
        base_url: &str,
        api_key: &ApiKey,
        request_timeout: Duration,
    ) -> Result<Self, ClientBuildError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(request_timeout))
            .build()?;
        Ok(Self {
            auth_header: (!api_key.is_empty()).then(|| format!("Bearer {}", api_key.expose())),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            client,
        })
    }

    /// Creates a client from the endpoint, credential, and timeout in `config`.
    pub fn from_configuration(config: &Configuration) -> Result<Self, ClientBuildError> {
        Self::new(
            &config.api_base_url,
            &config.api_key,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_request<'a>(
        request: &'a ChatRequest,
        parameters: &'a CompletionParameters,
    ) -> WireRequest<'a> {
        WireRequest {
            model: parameters.model.as_str(),
            messages: request
                .messages()
                .iter()
                .map(|m| WireMessage {
                    role: m.role().as_str(),
                    content: m.content(),
                })
                .collect(),
            temperature: parameters.temperature.as_f64(),
        }
    }

    fn extract_text(response: WireResponse) -> Result<String, CompletionError> {
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                CompletionError::new(
                    CompletionFailureKind::MalformedResponse,
                    "response contained no message content in its first choice",
                )
            })
    }

    fn status_error(status: StatusCode, body: &str) -> CompletionError {
        let kind = if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            CompletionFailureKind::Authentication
        } else {
            CompletionFailureKind::Service
        };
        CompletionError::new(kind, format!("{status}: {}", sanitize_error_body(body)))
    }

    fn transport_error(error: &reqwest::Error) -> CompletionError {
        let cause = if error.is_timeout() {
            "request timed out".to_string()
        } else if error.is_connect() {
            "could not connect to the completion service".to_string()
        } else {
            sanitize_error_body(&error.to_string())
        };
        CompletionError::new(CompletionFailureKind::Transport, cause)
    }
}

#[async_trait]
impl ChatCompletionClient for OpenAiChatClient {
    async fn complete(
        &self,
        request: &ChatRequest,
        parameters: &CompletionParameters,
    ) -> Result<String, CompletionError> {
        let auth_header = self.auth_header.as_deref().ok_or_else(|| {
            CompletionError::new(
                CompletionFailureKind::Authentication,
                "API key not set; run `mdai config set api-key <KEY>`",
            )
        })?;

        let body = Self::build_request(request, parameters);
        tracing::debug!(endpoint = %self.endpoint, model = body.model, "sending chat completion");

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, auth_header)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Self::transport_error(&e))?;
        if !status.is_success() {
            tracing::warn!(%status, "completion service returned an error status");
            return Err(Self::status_error(status, &text));
        }

        let parsed: WireResponse = serde_json::from_str(&text).map_err(|e| {
            CompletionError::new(
                CompletionFailureKind::MalformedResponse,
                format!("response JSON decode failed: {e}"),
            )
        })?;
        let content = Self::extract_text(parsed)?;
        tracing::debug!(response_chars = content.chars().count(), "completion received");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline::{ModelName, Temperature};

    fn parameters() -> CompletionParameters {
        CompletionParameters {
            model: ModelName::new("gpt-4").unwrap(),
            temperature: Temperature::new(0.8).unwrap(),
        }
    }

    #[test]
    fn endpoint_joins_base_url_without_double_slash() {
        let client = OpenAiChatClient::new(
            "https://api.example.com/v1/",
            &ApiKey::new("sk-test"),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.endpoint(), "https://api.example.com/v1/chat/completions");
    }

    #[test]
    fn empty_key_means_no_auth_header() {
        let client =
            OpenAiChatClient::new("http://localhost", &ApiKey::default(), Duration::from_secs(5))
                .unwrap();
        assert!(client.auth_header.is_none());

        let client =
            OpenAiChatClient::new("http://localhost", &ApiKey::new("sk-x"), Duration::from_secs(5))
                .unwrap();
        assert_eq!(client.auth_header.as_deref(), Some("Bearer sk-x"));
    }

    #[test]
    fn request_serialises_three_messages_in_order() {
        let request = ChatRequest::framed("Summarize: cats");
        let params = parameters();
        let wire = OpenAiChatClient::build_request(&request, &params);
        let json = serde_json::to_value(&wire).unwrap();

        assert_eq!(json["model"], "gpt-4");
        assert_eq!(json["temperature"], 0.8);
        let messages = json["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[2]["role"], "user");
        assert_eq!(messages[2]["content"], "Summarize: cats");
    }

    #[test]
    fn first_choice_content_is_returned() {
        let json = r#"{"choices":[{"message":{"content":"A"}},{"message":{"content":"B"}}]}"#;
        let response: WireResponse = serde_json::from_str(json).unwrap();
        assert_eq!(OpenAiChatClient::extract_text(response).unwrap(), "A");
    }

    #[test]
    fn empty_choices_are_malformed() {
        let response: WireResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        let err = OpenAiChatClient::extract_text(response).unwrap_err();
        assert_eq!(err.kind, CompletionFailureKind::MalformedResponse);
    }

    #[test]
    fn null_content_is_malformed() {
        let response: WireResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(OpenAiChatClient::extract_text(response).is_err());
    }

    #[test]
    fn status_errors_are_classified() {
        let auth = OpenAiChatClient::status_error(StatusCode::UNAUTHORIZED, "bad key sk-secret");
        assert_eq!(auth.kind, CompletionFailureKind::Authentication);
        assert!(!auth.cause.contains("sk-secret"));

        let service = OpenAiChatClient::status_error(StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert_eq!(service.kind, CompletionFailureKind::Service);
        assert!(service.cause.contains("429"));
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let client =
            OpenAiChatClient::new("http://127.0.0.1:9", &ApiKey::default(), Duration::from_secs(1))
                .unwrap();
        let err = client
            .complete(&ChatRequest::framed("x"), &parameters())
            .await
            .unwrap_err();
        assert_eq!(err.kind, CompletionFailureKind::Authentication);
        assert!(err.cause.contains("API key not set"));
    }
}
