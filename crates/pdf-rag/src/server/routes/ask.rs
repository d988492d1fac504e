//! Question endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{AskRequest, AskResponse, Source};

/// POST /api/ask - Answer a question from the indexed document
pub async fn ask(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>> {
    let start = Instant::now();

    let Json(request) = payload.map_err(rejection_error)?;
    request.validate(state.config().server.max_question_chars)?;

    tracing::info!("Question: \"{}\"", request.question);

    let output = state.pipeline().invoke_with_context(&request.question).await?;

    let sources = request
        .include_sources
        .then(|| output.retrieved.iter().map(Source::from).collect());

    let processing_time_ms = start.elapsed().as_millis() as u64;
    tracing::info!(
        "Answered in {}ms from {} chunks",
        processing_time_ms,
        output.retrieved.len()
    );

    Ok(Json(AskResponse {
        answer: output.answer,
        sources,
        processing_time_ms,
    }))
}

/// Body over the route limit is 413; any other JSON problem is the caller's 400
fn rejection_error(rejection: JsonRejection) -> Error {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge(rejection.body_text())
    } else {
        Error::invalid_request(rejection.body_text())
    }
}
