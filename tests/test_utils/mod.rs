//! Test utilities for integration tests
#![allow(dead_code)]
use std::fs;
use std::sync::Arc;

use axum::{Router, body::Body};
use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use square::api::AppState;
use square::api::app;
use square::api::maintenance::MaintenanceWindow;
use square::core::{AppConfig, FixedClock};

pub const INDEX_HTML: &str = "<!DOCTYPE html><html><body><div id=\"app\">Square</div></body></html>";
pub const MANIFEST_JSON: &str = r#"{"name":"Square","short_name":"Square"}"#;

/// 03:00 UTC, 11:00 in Beijing, outside of the maintenance window.
pub fn open_hours() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2025, 6, 1, 3, 0, 0).unwrap())
}

/// 15:00 UTC, 23:00 in Beijing, during the maintenance window.
pub fn maintenance_hours() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2025, 6, 1, 15, 0, 0).unwrap())
}

pub fn test_config(static_dir: &TempDir, upstream_url: &str, development: bool) -> AppConfig {
    AppConfig {
        host: String::from("127.0.0.1"),
        port: String::from("0"),
        static_dir: static_dir.path().display().to_string(),
        llm_api_url: upstream_url.to_string(),
        llm_api_key: String::from("test-api-key"),
        llm_model: String::from("gpt-4.1-mini"),
        system_message: String::from("You are Square."),
        development,
        maintenance: MaintenanceWindow::default(),
    }
}

/// Creates a test application router with a temporary static
/// directory. Keep the returned `TempDir` alive for as long as the
/// router is used.
pub fn test_app(clock: FixedClock, upstream_url: &str, development: bool) -> (Router, TempDir) {
    let dir = TempDir::new().expect("Failed to create static directory");
    fs::write(dir.path().join("index.html"), INDEX_HTML).expect("Failed to write index.html");
    fs::write(dir.path().join("manifest.json"), MANIFEST_JSON)
        .expect("Failed to write manifest.json");

    let config = test_config(&dir, upstream_url, development);
    let app_state = AppState::with_clock(config, Arc::new(clock));
    (app(Arc::new(app_state)), dir)
}

/// A router over the repo's real `public/` directory.
pub fn public_app(clock: FixedClock) -> Router {
    let dir = TempDir::new().expect("Failed to create scratch directory");
    let mut config = test_config(&dir, "http://localhost:9", false);
    config.static_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/public").to_string();
    app(Arc::new(AppState::with_clock(config, Arc::new(clock))))
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not utf-8")
}
