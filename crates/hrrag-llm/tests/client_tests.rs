use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
use hrrag_core::config::LlmSettings;
use hrrag_llm::{build_prompt, ChatModel, GroqClient, LlmError};
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct Seen { body: Arc<Mutex<Option<Value>>>, auth: Arc<Mutex<Option<String>>> }

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    addr
}

fn settings(addr: SocketAddr) -> LlmSettings {
    LlmSettings { url: format!("http://{addr}/openai/v1/chat/completions"), ..LlmSettings::default() }
}

#[test]
fn prompt_layout() {
    let prompt = build_prompt(&["Leave is 20 days.", "Sick leave needs a note."], "How much leave?");
    assert_eq!(
        prompt,
        "You are an HR assistant. Use this context to answer the question accurately.\n\nContext:\nLeave is 20 days.\n\nSick leave needs a note.\n\nQuestion: How much leave?\nAnswer:"
    );
    let empty: [&str; 0] = [];
    assert!(build_prompt(&empty, "q").contains("Context:\n\n\nQuestion: q"));
}

#[tokio::test]
async fn sends_openai_compatible_request() {
    let seen = Seen::default();
    let app = Router::new()
        .route(
            "/openai/v1/chat/completions",
            post(|State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>| async move {
                *seen.body.lock().unwrap() = Some(body);
                *seen.auth.lock().unwrap() = headers.get("authorization").and_then(|v| v.to_str().ok()).map(str::to_string);
                Json(json!({ "choices": [{ "message": { "role": "assistant", "content": "20 days." } }] }))
            }),
        )
        .with_state(seen.clone());
    let addr = serve(app).await;

    let client = GroqClient::with_key(&settings(addr), "test-key").unwrap();
    assert_eq!(client.complete("How much leave?").await.unwrap(), "20 days.");

    let body = seen.body.lock().unwrap().clone().expect("request body");
    assert_eq!(body["model"], "llama-3.1-8b-instant");
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(body["messages"][0]["content"], "How much leave?");
    assert!((body["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    assert_eq!(seen.auth.lock().unwrap().as_deref(), Some("Bearer test-key"));
}

#[tokio::test]
async fn non_success_status_is_provider_error() {
    let app = Router::new().route("/openai/v1/chat/completions", post(|| async { (StatusCode::TOO_MANY_REQUESTS, "rate limited") }));
    let addr = serve(app).await;
    let err = GroqClient::with_key(&settings(addr), "k").unwrap().complete("q").await.unwrap_err();
    match err {
        LlmError::Provider { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "rate limited");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn missing_choices_is_malformed() {
    let app = Router::new().route("/openai/v1/chat/completions", post(|| async { Json(json!({ "choices": [] })) }));
    let addr = serve(app).await;
    let err = GroqClient::with_key(&settings(addr), "k").unwrap().complete("q").await.unwrap_err();
    assert!(matches!(err, LlmError::Malformed(_)), "got {err:?}");
}

#[tokio::test]
async fn missing_key_fails_before_any_request() {
    let s = LlmSettings { url: "http://127.0.0.1:9/never".to_string(), ..LlmSettings::default() };
    let err = GroqClient::with_key(&s, "").unwrap().complete("q").await.unwrap_err();
    assert!(matches!(err, LlmError::ApiKeyMissing(ref var) if var == "GROQ_API_KEY"), "got {err:?}");
}

#[tokio::test]
async fn unreachable_endpoint_is_http_error() {
    let s = LlmSettings { url: "http://127.0.0.1:9/v1/chat/completions".to_string(), timeout_secs: 5, ..LlmSettings::default() };
    let err = GroqClient::with_key(&s, "k").unwrap().complete("q").await.unwrap_err();
    assert!(matches!(err, LlmError::Http(_) | LlmError::Timeout(_)), "got {err:?}");
}
