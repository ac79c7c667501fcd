// ChatCompletionClient against a wiremock server

use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tutor_gateway::templates::SOLVE;
use tutor_gateway::upstream::{ChatCompletionClient, GenerationRequest, TextGenerator, UpstreamError};

fn create_client(mock_server: &MockServer) -> ChatCompletionClient {
    ChatCompletionClient::new(mock_server.uri(), "test-api-key", "test-model", Duration::from_secs(10))
        .unwrap()
}

fn create_test_request() -> GenerationRequest {
    GenerationRequest {
        system: SOLVE.system.to_string(),
        user: SOLVE.user_message("What is 2 + 2?"),
        temperature: SOLVE.temperature,
        max_tokens: SOLVE.max_tokens,
    }
}

#[tokio::test]
async fn test_generate_success() {
    let mock_server = MockServer::start().await;

    let response_body = serde_json::json!({
        "id": "chatcmpl-1",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "{\"answer\": \"4\"}" },
            "finish_reason": "stop"
        }]
    });

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-api-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "test-model",
            "stream": false,
            "max_tokens": 1200,
            "messages": [
                { "role": "system", "content": SOLVE.system },
                { "role": "user", "content": SOLVE.user_message("What is 2 + 2?") }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let content = client.generate(create_test_request()).await.unwrap();

    assert_eq!(content.as_deref(), Some("{\"answer\": \"4\"}"));
}

#[tokio::test]
async fn test_generate_null_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": null } }]
        })))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    assert_eq!(client.generate(create_test_request()).await.unwrap(), None);
}

#[tokio::test]
async fn test_generate_no_choices() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    assert_eq!(client.generate(create_test_request()).await.unwrap(), None);
}

#[tokio::test]
async fn test_generate_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let error = client.generate(create_test_request()).await.unwrap_err();

    match error {
        UpstreamError::Status { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "overloaded");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_generate_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let error = client.generate(create_test_request()).await.unwrap_err();

    assert!(matches!(error, UpstreamError::Decode(_)));
}

#[tokio::test]
async fn test_generate_connection_refused() {
    // nothing listens on port 1
    let client = ChatCompletionClient::new("http://127.0.0.1:1", "k", "m", Duration::from_secs(2)).unwrap();
    let error = client.generate(create_test_request()).await.unwrap_err();

    assert!(matches!(error, UpstreamError::Request(_)));
}
