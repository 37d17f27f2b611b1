// Wire-format tests for the text generation providers against a local
// fake server standing in for Gemini, OpenAI and Ollama.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::{Json, Router};
use serde_json::{json, Value};

use pubg_coach_backend::error::LlmError;
use pubg_coach_backend::llm::{
    GeminiProvider, LlmClient, LlmProvider, OllamaProvider, OpenAiProvider,
    QUOTA_EXCEEDED_MESSAGE,
};

#[derive(Debug, Clone)]
struct Seen {
    path_and_query: String,
    authorization: Option<String>,
    goog_api_key: Option<String>,
    body: Value,
}

type Log = Arc<Mutex<Vec<Seen>>>;

async fn fake_upstream(State(log): State<Log>, uri: Uri, headers: HeaderMap, body: String) -> impl IntoResponse {
    let path = uri.path().to_string();
    log.lock().unwrap().push(Seen {
        path_and_query: uri
            .path_and_query()
            .map(|p| p.to_string())
            .unwrap_or_default(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        goog_api_key: headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_str(&body).unwrap_or(Value::Null),
    });

    if path.starts_with("/exhausted") {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": { "message": "Resource has been exhausted (e.g. check quota)." } })),
        );
    }
    if path.ends_with(":generateContent") {
        return (
            StatusCode::OK,
            Json(json!({
                "candidates": [ { "content": { "parts": [ { "text": "gemini says hi" } ] } } ]
            })),
        );
    }
    if path.ends_with("/chat/completions") {
        return (
            StatusCode::OK,
            Json(json!({ "choices": [ { "message": { "role": "assistant", "content": "openai says hi" } } ] })),
        );
    }
    if path.ends_with("/api/tags") {
        return (StatusCode::OK, Json(json!({ "models": [] })));
    }
    if path.ends_with("/api/generate") {
        return (StatusCode::OK, Json(json!({ "response": "ollama says hi", "done": true })));
    }
    (StatusCode::NOT_FOUND, Json(json!({ "error": "unknown route" })))
}

/// Start the fake upstream on an ephemeral port and return its base URL.
async fn spawn_upstream() -> (String, Log) {
    let log: Log = Arc::default();
    let app = Router::new().fallback(fake_upstream).with_state(log.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), log)
}

#[tokio::test]
async fn test_gemini_request_shape() {
    let (base, log) = spawn_upstream().await;
    let provider = GeminiProvider::new("g-key".into(), "gemini-test".into()).with_base_url(&base);

    assert_eq!(provider.complete("analyse this").await.unwrap(), "gemini says hi");

    let seen = log.lock().unwrap()[0].clone();
    assert_eq!(seen.path_and_query, "/models/gemini-test:generateContent");
    assert_eq!(seen.goog_api_key.as_deref(), Some("g-key"));
    assert_eq!(seen.authorization, None);
    assert_eq!(
        seen.body["contents"][0]["parts"][0]["text"],
        "analyse this"
    );
}

#[tokio::test]
async fn test_openai_request_shape() {
    let (base, log) = spawn_upstream().await;
    let provider = OpenAiProvider::new("o-key".into(), "gpt-3.5-turbo".into()).with_base_url(&base);

    assert_eq!(provider.complete("analyse this").await.unwrap(), "openai says hi");

    let seen = log.lock().unwrap()[0].clone();
    assert_eq!(seen.path_and_query, "/chat/completions");
    assert_eq!(seen.authorization.as_deref(), Some("Bearer o-key"));
    assert_eq!(seen.body["model"], "gpt-3.5-turbo");
    assert_eq!(seen.body["max_tokens"], 1500);
    assert_eq!(seen.body["messages"][0]["role"], "system");
    assert_eq!(seen.body["messages"][1]["content"], "analyse this");
}

#[tokio::test]
async fn test_ollama_availability_and_generate() {
    let (base, log) = spawn_upstream().await;
    let provider = OllamaProvider::new(base);

    assert!(provider.is_available().await);
    assert_eq!(provider.complete("analyse this").await.unwrap(), "ollama says hi");

    let log = log.lock().unwrap();
    assert_eq!(log[0].path_and_query, "/api/tags");
    assert_eq!(log[1].path_and_query, "/api/generate");
    assert_eq!(log[1].body["model"], "qwen2:0.5b");
    assert_eq!(log[1].body["stream"], false);
}

#[tokio::test]
async fn test_status_error_carries_body() {
    let (base, _) = spawn_upstream().await;
    let provider = GeminiProvider::new("g-key".into(), "m".into())
        .with_base_url(format!("{base}/exhausted"));

    match provider.complete("p").await {
        Err(LlmError::Status { provider, status, body }) => {
            assert_eq!(provider, "Gemini");
            assert_eq!(status, 429);
            assert!(body.contains("quota"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_client_falls_back_to_local_provider() {
    let (base, log) = spawn_upstream().await;
    let primary = OpenAiProvider::new("o-key".into(), "m".into())
        .with_base_url(format!("{base}/exhausted"));
    let client = LlmClient::new(
        Some(Arc::new(primary)),
        Some(Arc::new(OllamaProvider::new(base))),
    );

    assert_eq!(client.generate("p").await, "ollama says hi");
    let paths: Vec<String> = log
        .lock()
        .unwrap()
        .iter()
        .map(|s| s.path_and_query.clone())
        .collect();
    assert_eq!(
        paths,
        vec!["/exhausted/chat/completions", "/api/tags", "/api/generate"]
    );
}

#[tokio::test]
async fn test_client_quota_message_when_fallback_offline() {
    let (base, _) = spawn_upstream().await;
    let primary = GeminiProvider::new("g-key".into(), "m".into())
        .with_base_url(format!("{base}/exhausted"));
    let client = LlmClient::new(
        Some(Arc::new(primary)),
        Some(Arc::new(OllamaProvider::new("http://127.0.0.1:9"))),
    );

    assert_eq!(client.generate("p").await, QUOTA_EXCEEDED_MESSAGE);
}

#[tokio::test]
async fn test_transport_error_does_not_expose_gemini_key() {
    let primary = GeminiProvider::new("SECRET-GEMINI-KEY".into(), "gemini-1.5-flash".into())
        .with_base_url("http://127.0.0.1:9");
    let client = LlmClient::new(Some(Arc::new(primary)), None);

    let answer = client.generate("hi").await;
    assert!(answer.starts_with("AI analysis request failed:"), "{answer}");
    assert!(!answer.contains("SECRET-GEMINI-KEY"), "{answer}");
    assert!(!answer.contains("127.0.0.1:9"), "{answer}");
}
