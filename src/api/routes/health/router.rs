//! Router for the health API

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};

use super::public;
use crate::api::state::AppState;
use crate::core::iso_timestamp;

type SharedState = Arc<AppState>;

async fn health(State(state): State<SharedState>) -> Json<public::HealthResponse> {
    Json(public::HealthResponse {
        status: "healthy".to_string(),
        timestamp: iso_timestamp(state.clock.now()),
    })
}

/// Create the health router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", get(health))
}
