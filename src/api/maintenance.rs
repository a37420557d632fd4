//! Nightly maintenance window. While active every request, static
//! assets included, gets a 503 and a placeholder page.
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use chrono::{DateTime, FixedOffset, Timelike, Utc};
use http::StatusCode;

use crate::api::state::AppState;

/// A daily window of local hours, `[start_hour, end_hour)`, in a fixed
/// UTC offset. Windows where `start_hour > end_hour` wrap past
/// midnight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaintenanceWindow {
    pub utc_offset_hours: i32,
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for MaintenanceWindow {
    // 22:00 to 10:00 Beijing time
    fn default() -> Self {
        Self {
            utc_offset_hours: 8,
            start_hour: 22,
            end_hour: 10,
        }
    }
}

impl MaintenanceWindow {
    pub fn local_hour(&self, now: DateTime<Utc>) -> u32 {
        let offset = FixedOffset::east_opt(self.utc_offset_hours * 3600)
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is valid"));
        now.with_timezone(&offset).hour()
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        let hour = self.local_hour(now);
        if self.start_hour > self.end_hour {
            hour >= self.start_hour || hour < self.end_hour
        } else {
            hour >= self.start_hour && hour < self.end_hour
        }
    }
}

pub const MAINTENANCE_PAGE: &str = r#"<html style="height:100%"><head><meta charset='utf-8'><title>夜间维护中</title><meta name='viewport' content='width=device-width,initial-scale=1.0'></head>
<body style="display:flex;align-items:center;justify-content:center;height:100vh;margin:0;background:#f7f7fa;font-family:-apple-system,BlinkMacSystemFont,'SF Pro Display','Segoe UI',Roboto,sans-serif;">
  <div style="text-align:center;max-width:400px;padding:32px 24px;background:#fff;border-radius:24px;box-shadow:0 8px 32px rgba(0,0,0,0.08);">
    <div style="font-size:48px;line-height:1.2;margin-bottom:16px;">🌙</div>
    <h1 style="font-size:1.6rem;margin:0 0 12px 0;color:#007AFF;">夜间维护 + 充电时间</h1>
    <div style="font-size:1.1rem;color:#555;">本站服务休眠中<br>开放时间：10:00 - 22:00（北京时间）<br>感谢理解，祝您晚安！</div>
  </div>
</body></html>
"#;

/// Middleware that short circuits every request during the window.
pub async fn maintenance_gate(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let window = state.config.maintenance;
    if window.is_active(state.clock.now()) {
        tracing::debug!("Rejecting {} during maintenance window", request.uri());
        return (StatusCode::SERVICE_UNAVAILABLE, Html(MAINTENANCE_PAGE)).into_response();
    }
    next.run(request).await
}
