//! HTTP surface: `POST /query` and `GET /health`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use hrrag_core::config::ServerSettings;

use crate::qa::QaPipeline;

#[derive(Clone)]
pub struct AppState {
    pub qa: QaPipeline,
}

async fn query(State(state): State<AppState>, body: Result<Json<Value>, JsonRejection>) -> Response {
    let question = body
        .ok()
        .and_then(|Json(v)| v.get("question").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_default();
    if question.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "Missing question" }))).into_response();
    }
    match state.qa.answer(&question).await {
        Ok(answer) => Json(answer).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "query failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "status": "ok", "chunks": state.qa.retriever().len() }))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/query", post(query))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `host:port` and serve until Ctrl-C.
pub async fn serve(settings: &ServerSettings, state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", settings.host, settings.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on http://{}", addr);
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}
