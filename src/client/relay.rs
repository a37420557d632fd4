//! How the chat client reaches the relay service.
use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;

use crate::api::public::chat::{APOLOGY, ChatEnvelope, ChatRequest};

#[async_trait]
pub trait RelayTransport: Send + Sync {
    /// Send a turn and return the assistant's reply. The error's
    /// display text is what gets shown to the user.
    async fn send(&self, request: &ChatRequest) -> Result<String, Error>;
}

/// Talks to a running relay over HTTP.
pub struct HttpRelay {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRelay {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

/// Turn an HTTP status and body into the reply or a user facing error.
pub fn read_envelope(status: u16, body: &str) -> Result<String, Error> {
    let envelope: Option<ChatEnvelope> = serde_json::from_str(body).ok();
    let ok = (200..300).contains(&status);

    match envelope {
        Some(ChatEnvelope {
            success: true,
            message: Some(message),
            ..
        }) if ok => Ok(message),
        Some(ChatEnvelope {
            error: Some(error), ..
        }) => Err(anyhow!(error)),
        _ if !ok => Err(anyhow!("网络错误: {}", status)),
        _ => Err(anyhow!(APOLOGY)),
    }
}

#[async_trait]
impl RelayTransport for HttpRelay {
    async fn send(&self, request: &ChatRequest) -> Result<String, Error> {
        let response = self
            .client
            .post(self.chat_url())
            .header("Content-Type", "application/json")
            .timeout(Duration::from_secs(180))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Relay request failed: {}", e);
                anyhow!(APOLOGY)
            })?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        read_envelope(status, &body)
    }
}
