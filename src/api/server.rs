use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use axum::middleware;
use axum::{Router, extract::Request, response::Response};
use http::{HeaderValue, header};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use super::maintenance::maintenance_gate;
use super::routes;
use crate::api::state::AppState;
use crate::core::AppConfig;

/// Content type to force for a static asset path, if any.
fn static_content_type(path: &str) -> Option<&'static str> {
    if path.ends_with("manifest.json") {
        Some("application/manifest+json")
    } else if path.ends_with(".json") {
        Some("application/json")
    } else {
        None
    }
}

async fn set_static_content_type(request: Request, next: middleware::Next) -> Response {
    let content_type = static_content_type(request.uri().path());
    let mut response = next.run(request).await;
    if let Some(content_type) = content_type
        && response.status().is_success()
    {
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    response
}

pub fn app(shared_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::permissive();
    let static_dir = Path::new(&shared_state.config.static_dir).to_path_buf();

    Router::new()
        // API routes
        .nest("/api", routes::router())
        // Client entry page
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        // Static server of assets in the public dir
        .fallback_service(
            ServiceBuilder::new()
                .layer(middleware::from_fn(set_static_content_type))
                .service(ServeDir::new(&static_dir)),
        )
        // Runs before any route or static file
        .layer(middleware::from_fn_with_state(
            Arc::clone(&shared_state),
            maintenance_gate,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::clone(&shared_state))
}

// Run the server
pub async fn serve(host: String, port: String, config: AppConfig) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // axum logs rejections from built-in extractors with the `axum::rejection`
                // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
                format! {
                    "{}=debug,tower_http=debug,axum::rejection=trace",
                    env!("CARGO_CRATE_NAME")
                }
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.llm_api_url.is_empty() || config.llm_api_key.is_empty() {
        tracing::warn!("SQUARE_LLM_URL or SQUARE_LLM_API_KEY is not set, chat requests will fail");
    }

    let app_state = AppState::new(config);
    let app = app(Arc::new(app_state));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;

    tracing::info!("Square companion listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
