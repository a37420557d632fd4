//! Chat models offered to users and how they map onto the model that
//! is actually requested from the upstream API.
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{Error, anyhow};
use serde::{Deserialize, Serialize};

/// The models a user can pick in settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChatModel {
    #[default]
    #[serde(rename = "gpt-4.1")]
    Gpt41,
    #[serde(rename = "o4-mini")]
    O4Mini,
    #[serde(rename = "gpt-4.1-mini")]
    Gpt41Mini,
}

impl ChatModel {
    pub const ALL: [ChatModel; 3] = [ChatModel::Gpt41, ChatModel::O4Mini, ChatModel::Gpt41Mini];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChatModel::Gpt41 => "gpt-4.1",
            ChatModel::O4Mini => "o4-mini",
            ChatModel::Gpt41Mini => "gpt-4.1-mini",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ChatModel::Gpt41 => "GPT-4.1",
            ChatModel::O4Mini => "o4-mini",
            ChatModel::Gpt41Mini => "GPT-4.1 Mini",
        }
    }
}

impl fmt::Display for ChatModel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChatModel::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| anyhow!("Unknown model: {}", s))
    }
}

/// Resolves a requested model name to an upstream model identifier.
pub trait ModelRouter: Send + Sync {
    fn route(&self, requested: &str) -> String;
}

/// Lookup table with a fallback for names it doesn't know.
#[derive(Clone, Debug)]
pub struct StaticModelTable {
    routes: HashMap<String, String>,
    fallback: String,
}

impl StaticModelTable {
    pub fn new(routes: HashMap<String, String>, fallback: &str) -> Self {
        Self {
            routes,
            fallback: fallback.to_string(),
        }
    }

    /// Every user facing model is served by the same upstream model.
    pub fn collapsed(upstream: &str) -> Self {
        let routes = ChatModel::ALL
            .iter()
            .map(|m| (m.as_str().to_string(), upstream.to_string()))
            .collect();
        Self::new(routes, upstream)
    }
}

impl ModelRouter for StaticModelTable {
    fn route(&self, requested: &str) -> String {
        self.routes
            .get(requested)
            .unwrap_or(&self.fallback)
            .clone()
    }
}
