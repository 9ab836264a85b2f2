//! Assistant Proxy Route
//!
//! - POST /api/ai - Forward a conversation to the chat backend
//!
//! The API credential never leaves the server. Backend failures are not
//! surfaced as errors: the caller gets the fixed fallback reply with a 500.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{AiRequest, AiResponse};
use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::assistant::FALLBACK_REPLY;

/// POST /api/ai
pub async fn ask(State(state): State<Arc<AppState>>, Json(req): Json<AiRequest>) -> Response {
    if req.messages.is_empty() {
        return ApiError::Validation("messages cannot be empty".to_string()).into_response();
    }

    match state.assistant.complete(&req.messages).await {
        Ok(reply) => {
            tracing::info!(turns = req.messages.len(), "Assistant reply sent");
            (StatusCode::OK, Json(AiResponse { reply })).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, turns = req.messages.len(), "Assistant call failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AiResponse {
                    reply: FALLBACK_REPLY.to_string(),
                }),
            )
                .into_response()
        }
    }
}
