//! Router for the chat API

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::core::iso_timestamp;

type SharedState = Arc<AppState>;

/// Relay a chat turn upstream and wrap the reply
async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<public::ChatRequest>,
) -> Result<Json<public::ChatReply>, ApiError> {
    let reply = state
        .relay
        .next_msg(
            payload.message.as_deref(),
            &payload.history,
            &payload.model,
            payload.personality.as_deref(),
        )
        .await
        .map_err(|e| ApiError::from(e).exposing_details(state.config.development))?;

    let content = reply.content.unwrap_or_default();
    let timestamp = iso_timestamp(state.clock.now());

    Ok(Json(public::ChatReply::new(&content, &timestamp)))
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", post(chat_handler))
}
