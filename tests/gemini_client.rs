use job_url_builder::config::ModelConfig;
use job_url_builder::gateway::{GeminiClient, LanguageModel, ModelRequest};
use mockito::Matcher;
use serde_json::json;

fn config_for(server: &mockito::ServerGuard) -> ModelConfig {
    ModelConfig {
        api_key: Some("test-key".to_string()),
        model: "gemini-test".to_string(),
        base_url: format!("{}/", server.url()),
        timeout_seconds: 5,
    }
}

#[tokio::test]
async fn sends_instruction_contents_and_schema() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/models/gemini-test:generateContent")
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::PartialJson(json!({
            "systemInstruction": {"parts": [{"text": "Extract filters."}]},
            "contents": [{"role": "user", "parts": [{"text": "rust in berlin"}]}],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {"type": "OBJECT"}
            }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"{\"keywords\":"},{"text":"\"Rust\"}"}]}}]}"#,
        )
        .create_async()
        .await;

    let client = GeminiClient::new(&config_for(&server)).unwrap();
    let request = ModelRequest::text("Extract filters.", "rust in berlin")
        .with_json_schema(json!({"type": "OBJECT"}));

    let text = client.generate(request).await.unwrap();

    assert_eq!(text, r#"{"keywords":"Rust"}"#);
    mock.assert_async().await;
}

#[tokio::test]
async fn plain_text_requests_omit_generation_config() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/models/gemini-test:generateContent")
        .match_body(Matcher::Json(json!({
            "systemInstruction": {"parts": [{"text": "Write a query."}]},
            "contents": [{"role": "user", "parts": [{"text": "{}"}]}]
        })))
        .with_status(200)
        .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"(rust) AND (tokio)"}]}}]}"#)
        .create_async()
        .await;

    let client = GeminiClient::new(&config_for(&server)).unwrap();
    let text = client
        .generate(ModelRequest::text("Write a query.", "{}"))
        .await
        .unwrap();

    assert_eq!(text, "(rust) AND (tokio)");
    mock.assert_async().await;
}

#[tokio::test]
async fn error_status_is_reported_with_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/models/gemini-test:generateContent")
        .with_status(429)
        .with_body("quota exceeded")
        .create_async()
        .await;

    let client = GeminiClient::new(&config_for(&server)).unwrap();
    let err = client
        .generate(ModelRequest::text("x", "y"))
        .await
        .unwrap_err()
        .to_string();

    assert!(err.contains("429"), "{err}");
    assert!(err.contains("quota exceeded"), "{err}");
}

#[tokio::test]
async fn blocked_prompt_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/models/gemini-test:generateContent")
        .with_status(200)
        .with_body(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#)
        .create_async()
        .await;

    let client = GeminiClient::new(&config_for(&server)).unwrap();
    let err = client
        .generate(ModelRequest::text("x", "y"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("SAFETY"));
}

#[test]
fn missing_key_is_rejected_up_front() {
    let config = ModelConfig {
        api_key: Some("  ".to_string()),
        model: "gemini-test".to_string(),
        base_url: "http://localhost".to_string(),
        timeout_seconds: 5,
    };
    assert!(GeminiClient::new(&config).is_err());
}
