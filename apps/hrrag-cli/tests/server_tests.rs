use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use hrrag_cli::server::{build_router, AppState};
use hrrag_cli::QaPipeline;
use hrrag_core::error::{Error, Result as CoreResult};
use hrrag_core::store::ChunkStore;
use hrrag_core::traits::Embedder;
use hrrag_embed::FakeEmbedder;
use hrrag_hybrid::{HybridRanker, RetrievalContext, RetrievalService};
use hrrag_llm::{ChatModel, LlmError};
use hrrag_text::Bm25Params;

const DIM: usize = 32;

/// Answers with the prompt length so tests can tell the prompt was built.
struct EchoModel;

#[async_trait]
impl ChatModel for EchoModel {
    fn name(&self) -> &str { "echo" }
    async fn complete(&self, prompt: &str) -> hrrag_llm::error::Result<String> {
        Ok(format!("prompt has {} chars", prompt.len()))
    }
}

struct DownModel;

#[async_trait]
impl ChatModel for DownModel {
    fn name(&self) -> &str { "down" }
    async fn complete(&self, _prompt: &str) -> hrrag_llm::error::Result<String> {
        Err(LlmError::Provider { status: 503, body: "upstream unavailable".to_string() })
    }
}

/// Right dimension, but every call fails the way an unreachable embedding service does.
struct UnreachableEmbedder;

impl Embedder for UnreachableEmbedder {
    fn dim(&self) -> usize { DIM }
    fn max_len(&self) -> usize { 256 }
    fn embed_batch(&self, _texts: &[String]) -> CoreResult<Vec<Vec<f32>>> {
        Err(Error::Embedding("embedding service unreachable".to_string()))
    }
}

fn service() -> RetrievalService { service_with(Box::new(FakeEmbedder::new(DIM))) }

fn service_with(query_embedder: Box<dyn Embedder>) -> RetrievalService {
    let texts = vec![
        "Sick leave requires a medical certificate after three consecutive days".to_string(),
        "Remote work is allowed two days per week with manager approval".to_string(),
        "Expense claims must be submitted within thirty days".to_string(),
    ];
    let embedder = FakeEmbedder::new(DIM);
    let vectors = texts.iter().map(|t| embedder.embed_text(t)).collect();
    let store = ChunkStore::from_parts(texts, vectors).expect("store");
    RetrievalContext::from_store(store, Bm25Params::default())
        .expect("context")
        .into_service(query_embedder, HybridRanker::default())
        .expect("service")
}

fn app(model: Arc<dyn ChatModel>) -> axum::Router { app_with(service(), model) }

fn app_with(service: RetrievalService, model: Arc<dyn ChatModel>) -> axum::Router {
    let qa = QaPipeline::new(Arc::new(service), model, 2, Duration::from_secs(5));
    build_router(AppState { qa })
}

fn post_query(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/query")
        .header("content-type", "application/json")
        .body(body.into())
        .expect("request")
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn query_returns_answer_and_sources() {
    let resp = app(Arc::new(EchoModel)).oneshot(post_query(json!({ "question": "How many remote days?" }).to_string())).await.expect("response");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert!(body["answer"].as_str().expect("answer").starts_with("prompt has "));
    let sources = body["sources"].as_array().expect("sources");
    assert_eq!(sources.len(), 2);
    assert!(sources.iter().all(|s| s.is_string()));
}

#[tokio::test]
async fn missing_question_is_bad_request() {
    let resp = app(Arc::new(EchoModel)).oneshot(post_query(json!({ "q": "typo" }).to_string())).await.expect("response");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await, json!({ "error": "Missing question" }));
}

#[tokio::test]
async fn blank_question_is_bad_request() {
    let resp = app(Arc::new(EchoModel)).oneshot(post_query(json!({ "question": "   " }).to_string())).await.expect("response");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_json_is_bad_request() {
    let resp = app(Arc::new(EchoModel)).oneshot(post_query("{not json")).await.expect("response");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "Missing question");
}

#[tokio::test]
async fn model_failure_is_internal_error_with_message() {
    let resp = app(Arc::new(DownModel)).oneshot(post_query(json!({ "question": "expenses?" }).to_string())).await.expect("response");
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert!(body["error"].as_str().expect("error").contains("503"));
}

#[tokio::test]
async fn embedding_failure_is_internal_error_with_message() {
    let app = app_with(service_with(Box::new(UnreachableEmbedder)), Arc::new(EchoModel));
    let resp = app.oneshot(post_query(json!({ "question": "sick leave?" }).to_string())).await.expect("response");
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert!(body["error"].as_str().expect("error").contains("embedding service unreachable"), "body was {body}");
}

#[tokio::test]
async fn expired_embedding_deadline_is_internal_error() {
    let qa = QaPipeline::new(Arc::new(service()), Arc::new(EchoModel), 2, Duration::ZERO);
    let resp = build_router(AppState { qa }).oneshot(post_query(json!({ "question": "sick leave?" }).to_string())).await.expect("response");
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_json(resp).await["error"].as_str().expect("error").contains("deadline exceeded"));
}

#[tokio::test]
async fn health_reports_chunk_count() {
    let req = Request::builder().uri("/health").body(Body::empty()).expect("request");
    let resp = app(Arc::new(EchoModel)).oneshot(req).await.expect("response");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({ "status": "ok", "chunks": 3 }));
}
