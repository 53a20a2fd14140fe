//! Chat transcript persisted as a JSON array of `{role, content, time}`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use hrrag_core::store::write_atomic;

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const PREVIEW_CHARS: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub time: String,
}

#[derive(Debug)]
pub struct ChatHistory {
    path: PathBuf,
    messages: Vec<ChatMessage>,
}

impl ChatHistory {
    /// A missing or unreadable file starts an empty history.
    pub fn load(path: &Path) -> Self {
        let messages = match std::fs::read(path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable chat history");
                Vec::new()
            }),
            Err(_) => Vec::new(),
        };
        Self { path: path.to_path_buf(), messages }
    }

    pub fn save(&self) -> hrrag_core::Result<()> {
        write_atomic(&self.path, &serde_json::to_vec_pretty(&self.messages)?)
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        let time = chrono::Local::now().format(TIME_FORMAT).to_string();
        self.messages.push(ChatMessage { role, content: content.into(), time });
    }

    /// Append, then write the whole history to disk.
    pub fn record(&mut self, role: Role, content: impl Into<String>) -> hrrag_core::Result<()> {
        self.push(role, content);
        self.save()
    }

    pub fn clear(&mut self) { self.messages.clear(); }
    pub fn messages(&self) -> &[ChatMessage] { &self.messages }
    pub fn path(&self) -> &Path { &self.path }

    pub fn user_questions(&self) -> impl Iterator<Item = &ChatMessage> + '_ {
        self.messages.iter().filter(|m| m.role == Role::User)
    }

    /// `(number, preview, time)` for every user question, newest first. Numbers
    /// count from the oldest question, so the newest has the highest number.
    pub fn summaries(&self) -> Vec<(usize, String, String)> {
        let questions: Vec<&ChatMessage> = self.user_questions().collect();
        let total = questions.len();
        questions.iter().rev().enumerate().map(|(i, m)| (total - i, preview(&m.content, PREVIEW_CHARS), m.time.clone())).collect()
    }
}

/// First `max` characters, with `...` appended when anything was cut.
pub fn preview(content: &str, max: usize) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() { format!("{head}...") } else { head }
}
