//! The client's conversation history, in the order turns happened.
use chrono::{DateTime, Utc};

use crate::ai::chat::{HISTORY_WINDOW, recent_window};
use crate::openai::{Message, Role};

#[derive(Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    pub message: Message,
    pub at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn role(&self) -> Role {
        self.message.role
    }

    pub fn content(&self) -> &str {
        self.message.content.as_deref().unwrap_or_default()
    }
}

/// Unbounded in memory; only the most recent window is sent upstream.
#[derive(Clone, Debug, Default)]
pub struct History(Vec<HistoryEntry>);

impl History {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, role: Role, content: &str, at: DateTime<Utc>) {
        self.0.push(HistoryEntry {
            message: Message::new(role, content),
            at,
        });
    }

    pub fn clear(&mut self) {
        self.0.clear()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryEntry> {
        self.0.iter()
    }

    /// The turns sent along with the next message.
    pub fn upstream_window(&self) -> Vec<Message> {
        recent_window(&self.0, HISTORY_WINDOW)
            .iter()
            .map(|e| e.message.clone())
            .collect()
    }
}
