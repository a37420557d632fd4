//! Public API types

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;

use crate::api::routes::chat::public::ChatFailure;

// Errors

/// The only error shape the API returns. The underlying error is
/// always logged; its text only reaches the client when
/// `expose_details` is set.
pub struct ApiError {
    source: anyhow::Error,
    expose_details: bool,
}

impl ApiError {
    pub fn exposing_details(mut self, expose: bool) -> Self {
        self.expose_details = expose;
        self
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Always log the error
        tracing::error!(
            "API Error: {}. Root cause: {}",
            self.source,
            self.source.root_cause()
        );

        let details = self.expose_details.then(|| format!("{:#}", self.source));
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ChatFailure::new(details)),
        )
            .into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self {
            source: err.into(),
            expose_details: false,
        }
    }
}

// Re-export public types from each route

pub mod chat {
    pub use crate::api::routes::chat::public::*;
}

pub mod health {
    pub use crate::api::routes::health::public::*;
}
