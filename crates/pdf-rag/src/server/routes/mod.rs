//! API routes for the RAG server

pub mod ask;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_body_size: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/ask",
            post(ask::ask).layer(DefaultBodyLimit::max(max_body_size)),
        )
        .route("/info", get(info))
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Json<Value> {
    let pipeline = state.pipeline();
    let retriever = pipeline.retriever();
    let report = state.report();

    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Question answering over an indexed PDF document",
        "endpoints": {
            "POST /api/ask": "Answer a question from the indexed document",
            "GET /api/info": "Service and index information",
            "GET /health": "Liveness check",
            "GET /ready": "Readiness check"
        },
        "models": {
            "embedding": retriever.embedder().model(),
            "generation": pipeline.llm().model(),
            "generation_provider": pipeline.llm().name(),
        },
        "index": {
            "backend": retriever.index().name(),
            "documents": report.documents,
            "chunks": report.chunks,
            "reused_snapshot": report.reused_snapshot,
            "top_k": retriever.top_k(),
        }
    }))
}
