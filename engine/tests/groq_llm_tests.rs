//! Groq chat adapter tests against a mocked HTTP backend.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use colloquy_engine::{CompletionRequest, GroqChat, GroqConfig, LanguageModel, ProviderError};

fn client_for(server: &MockServer) -> GroqChat {
    GroqChat::new(
        GroqConfig::new("gsk_test_key")
            .with_base_url(server.uri())
            .with_timeout(Duration::from_secs(2)),
    )
    .unwrap()
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    })
}

#[tokio::test]
async fn test_complete_returns_assistant_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer gsk_test_key"))
        .and(body_partial_json(json!({"model": "llama-3.3-70b-versatile"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion_body(r#"{"topic": "Solar"}"#)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let text = client
        .complete(CompletionRequest::new("system", "prompt"))
        .await
        .unwrap();
    assert_eq!(text, r#"{"topic": "Solar"}"#);
}

#[tokio::test]
async fn test_model_override_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": "llama-3.1-8b-instant"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let text = client
        .complete(
            CompletionRequest::new("system", "prompt")
                .with_model(Some("llama-3.1-8b-instant".to_string())),
        )
        .await
        .unwrap();
    assert_eq!(text, "ok");
}

#[tokio::test]
async fn test_unauthorized_maps_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Invalid API Key", "type": "invalid_request_error"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .complete(CompletionRequest::new("system", "prompt"))
        .await
        .unwrap_err();
    match err {
        ProviderError::Auth(message) => assert!(message.contains("Invalid API Key")),
        other => panic!("expected Auth, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_maps_to_transport() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .complete(CompletionRequest::new("system", "prompt"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Transport(_)));
}

#[tokio::test]
async fn test_undecodable_body_maps_to_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .complete(CompletionRequest::new("system", "prompt"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Malformed(_)));
}

#[tokio::test]
async fn test_empty_choices_maps_to_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .complete(CompletionRequest::new("system", "prompt"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Malformed(_)));
}

#[tokio::test]
async fn test_slow_response_maps_to_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_body("late"))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = GroqChat::new(
        GroqConfig::new("gsk_test_key")
            .with_base_url(server.uri())
            .with_timeout(Duration::from_millis(50)),
    )
    .unwrap();

    let err = client
        .complete(CompletionRequest::new("system", "prompt"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Timeout(_)));
}
