//! Public types for the chat API
use serde::{Deserialize, Serialize};

use crate::openai::Message;

/// Shown to users whenever a turn can't be completed.
pub const APOLOGY: &str = "抱歉，我现在有些困扰，请稍后再试 😔";

fn default_model() -> String {
    "gpt-4.1".to_string()
}

/// A chat turn from the client. Only the JSON shape is checked, a
/// missing `message` is passed along for upstream to reject.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChatRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub history: Vec<Message>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
}

impl ChatReply {
    pub fn new(message: &str, timestamp: &str) -> Self {
        Self {
            success: true,
            message: message.into(),
            timestamp: timestamp.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatFailure {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ChatFailure {
    pub fn new(details: Option<String>) -> Self {
        Self {
            success: false,
            error: APOLOGY.to_string(),
            details,
        }
    }
}

/// Either envelope as seen by a client, which can't know up front
/// which one it got.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ChatEnvelope {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    pub error: Option<String>,
    pub details: Option<String>,
    pub timestamp: Option<String>,
}
