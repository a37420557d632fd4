use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

/// A single role tagged turn in a conversation. Content is optional
/// because a client may omit it; the upstream API decides whether that
/// is acceptable.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Message {
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: Some(content.to_string()),
        }
    }

    pub fn is_system(&self) -> bool {
        self.role == Role::System
    }
}

/// Sampling parameters sent with every completion request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompletionParams {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            max_tokens: 2000,
        }
    }
}

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Build the JSON body for an OpenAI compatible chat completion.
pub fn completion_payload(messages: &[Message], model: &str, params: &CompletionParams) -> Value {
    json!({
        "model": model,
        "messages": messages,
        "temperature": params.temperature,
        "max_tokens": params.max_tokens,
    })
}

/// POST a chat completion to `api_url` (the full endpoint URL) and
/// return the decoded response body. Non-2xx statuses are errors.
pub async fn completion(
    messages: &[Message],
    api_url: &str,
    api_key: &str,
    model: &str,
    params: &CompletionParams,
) -> Result<Value, Error> {
    let payload = completion_payload(messages, model, params);
    let response = reqwest::Client::new()
        .post(api_url)
        .bearer_auth(api_key)
        .header("Content-Type", "application/json")
        .timeout(REQUEST_TIMEOUT)
        .json(&payload)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(response)
}

/// Pull the text of the first choice out of a completion response.
pub fn first_choice_content(resp: &Value) -> Result<String, Error> {
    resp["choices"][0]["message"]["content"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| anyhow!("No message received. Resp:\n\n {}", resp))
}
