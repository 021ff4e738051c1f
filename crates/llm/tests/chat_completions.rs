use std::time::Duration;

use llm::OpenAiChatClient;
use pipeline::templates::{SYSTEM_FRAMING, TASK_FRAMING};
use pipeline::{
    ApiKey, ChatCompletionClient, ChatRequest, CompletionFailureKind, CompletionParameters,
    ModelName, Temperature,
};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn parameters(model: &str, temperature: f64) -> CompletionParameters {
    CompletionParameters {
        model: ModelName::new(model).unwrap(),
        temperature: Temperature::new(temperature).unwrap(),
    }
}

fn client_for(server: &MockServer, timeout: Duration) -> OpenAiChatClient {
    OpenAiChatClient::new(&server.uri(), &ApiKey::new("sk-test-key"), timeout).unwrap()
}

#[tokio::test]
async fn sends_framed_request_and_returns_first_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [
                {"message": {"role": "assistant", "content": "Cats are mammals."}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5));
    let text = client
        .complete(
            &ChatRequest::framed("Summarize: cats"),
            &parameters("gpt-4o", 0.3),
        )
        .await
        .unwrap();
    assert_eq!(text, "Cats are mammals.");

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = requests[0].body_json().unwrap();
    assert_eq!(body["model"], "gpt-4o");
    assert_eq!(body["temperature"], 0.3);
    assert_eq!(
        body["messages"],
        json!([
            {"role": "system", "content": SYSTEM_FRAMING},
            {"role": "user", "content": TASK_FRAMING},
            {"role": "user", "content": "Summarize: cats"}
        ])
    );
}

#[tokio::test]
async fn unauthorized_maps_to_authentication_failure_without_leaking_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string(
            r#"{"error":{"message":"Incorrect API key provided: sk-test-key"}}"#,
        ))
        .mount(&server)
        .await;

    let err = client_for(&server, Duration::from_secs(5))
        .complete(&ChatRequest::framed("x"), &parameters("gpt-4", 0.8))
        .await
        .unwrap_err();

    assert_eq!(err.kind, CompletionFailureKind::Authentication);
    assert!(err.cause.starts_with("401"));
    assert!(!err.cause.contains("sk-test-key"));
    assert!(err.to_string().starts_with("Completion failed"));
}

#[tokio::test]
async fn server_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server, Duration::from_secs(5))
        .complete(&ChatRequest::framed("x"), &parameters("gpt-4", 0.8))
        .await
        .unwrap_err();

    assert_eq!(err.kind, CompletionFailureKind::Service);
    assert!(err.cause.contains("overloaded"));
}

#[tokio::test]
async fn invalid_json_is_malformed_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server, Duration::from_secs(5))
        .complete(&ChatRequest::framed("x"), &parameters("gpt-4", 0.8))
        .await
        .unwrap_err();

    assert_eq!(err.kind, CompletionFailureKind::MalformedResponse);
}

#[tokio::test]
async fn stalled_service_hits_request_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"choices": [{"message": {"content": "late"}}]}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let err = client_for(&server, Duration::from_millis(300))
        .complete(&ChatRequest::framed("x"), &parameters("gpt-4", 0.8))
        .await
        .unwrap_err();

    assert_eq!(err.kind, CompletionFailureKind::Transport);
    assert!(err.cause.contains("timed out"));
}
