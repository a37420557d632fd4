//! Export the conversation as a human readable text file.
use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use super::history::History;
use crate::ai::prompt::{Prompt, templates};
use crate::openai::Role;

const EXPORT_TITLE: &str = "Square AI虚拟伴侣 - 聊天记录";

#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

#[derive(Serialize)]
struct ExportMessage<'a> {
    timestamp: String,
    sender: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ExportData<'a> {
    title: &'a str,
    exported_at: String,
    total: usize,
    separator: String,
    messages: Vec<ExportMessage<'a>>,
}

fn sender(role: Role) -> &'static str {
    match role {
        Role::User => "我",
        _ => "Square",
    }
}

fn local_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// `square-chat_2025-06-01T03-00-00.txt`
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("square-chat_{}.txt", now.format("%Y-%m-%dT%H-%M-%S"))
}

/// Render the history, oldest first. Returns `None` when there is
/// nothing to export.
pub fn export_history(history: &History, now: DateTime<Utc>) -> Result<Option<ExportFile>> {
    if history.is_empty() {
        return Ok(None);
    }

    let data = ExportData {
        title: EXPORT_TITLE,
        exported_at: local_time(now),
        total: history.len(),
        separator: "=".repeat(50),
        messages: history
            .iter()
            .map(|entry| ExportMessage {
                timestamp: local_time(entry.at),
                sender: sender(entry.role()),
                content: entry.content(),
            })
            .collect(),
    };
    let contents = templates().render(&Prompt::ChatExport.to_string(), &data)?;

    Ok(Some(ExportFile {
        file_name: export_file_name(now),
        contents,
    }))
}
