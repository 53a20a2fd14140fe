use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::IngestSettings;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Upper bound on chunk length, in characters.
    pub chunk_size: usize,
    /// Characters carried from the tail of one chunk into the next.
    pub chunk_overlap: usize,
    /// Tried in order; the first one present in a piece of text is used to split it.
    pub separators: Vec<String>,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        let s = IngestSettings::default();
        Self { chunk_size: s.chunk_size, chunk_overlap: s.chunk_overlap, separators: s.separators }
    }
}

impl From<&IngestSettings> for ChunkingConfig {
    fn from(s: &IngestSettings) -> Self {
        Self { chunk_size: s.chunk_size, chunk_overlap: s.chunk_overlap, separators: s.separators.clone() }
    }
}

#[derive(Default)]
pub struct DataProcessor {
    chunking_config: ChunkingConfig,
}

impl DataProcessor {
    pub fn new() -> Self { Self::default() }

    pub fn with_config(chunking_config: ChunkingConfig) -> Result<Self> {
        if chunking_config.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be positive".to_string()));
        }
        if chunking_config.chunk_overlap > chunking_config.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunk_overlap {} is larger than chunk_size {}",
                chunking_config.chunk_overlap, chunking_config.chunk_size
            )));
        }
        Ok(Self { chunking_config })
    }

    /// Read the extracted document text. A `.json` file must hold `{"content": "..."}`;
    /// a directory contributes every `.txt` file below it in path order.
    pub fn load_source(&self, path: &Path) -> Result<String> {
        if path.is_dir() {
            let files = self.list_txt_files(path);
            if files.is_empty() {
                return Err(Error::NotFound(format!("no .txt files under {}", path.display())));
            }
            let mut parts = Vec::with_capacity(files.len());
            for file in &files {
                tracing::debug!(file = %file.display(), "reading source file");
                parts.push(self.read_file_content(file)?);
            }
            tracing::info!(files = files.len(), dir = %path.display(), "loaded source directory");
            return Ok(parts.join("\n"));
        }
        if !path.exists() {
            return Err(Error::NotFound(path.display().to_string()));
        }
        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            let value: serde_json::Value = serde_json::from_str(&self.read_file_content(path)?)?;
            return value
                .get("content")
                .and_then(|c| c.as_str())
                .map(str::to_string)
                .ok_or_else(|| Error::InvalidConfig(format!("{} has no string \"content\" field", path.display())));
        }
        self.read_file_content(path)
    }

    /// Clean, then split into chunks.
    pub fn process_text(&self, raw: &str) -> Vec<String> {
        let cleaned = clean_text(raw);
        let chunks = self.chunk_text(&cleaned);
        tracing::info!(chars = cleaned.chars().count(), chunks = chunks.len(), "chunked document");
        chunks
    }

    /// Recursive character splitting with overlap. Lengths are counted in chars.
    pub fn chunk_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.chunking_config.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let chunk_size = self.chunking_config.chunk_size;
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut rest: &[String] = &[];
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() {
                separator = "";
                break;
            }
            if text.contains(sep.as_str()) {
                separator = sep;
                rest = &separators[i + 1..];
                break;
            }
        }

        let mut final_chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                final_chunks.extend(self.merge_pieces(&pending));
                pending.clear();
            }
            if rest.is_empty() {
                final_chunks.push(piece.to_string());
            } else {
                final_chunks.extend(self.split_recursive(piece, rest));
            }
        }
        if !pending.is_empty() {
            final_chunks.extend(self.merge_pieces(&pending));
        }
        final_chunks
    }

    /// Greedily pack small pieces into chunks of at most `chunk_size` chars,
    /// keeping up to `chunk_overlap` chars of trailing pieces for the next chunk.
    fn merge_pieces(&self, pieces: &[&str]) -> Vec<String> {
        let ChunkingConfig { chunk_size, chunk_overlap, .. } = self.chunking_config;
        let mut docs = Vec::new();
        let mut current: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;
        for &piece in pieces {
            let len = char_len(piece);
            if total + len > chunk_size {
                if total > chunk_size {
                    tracing::warn!(total, chunk_size, "created a chunk longer than chunk_size");
                }
                if !current.is_empty() {
                    push_joined(&mut docs, &current);
                    while total > chunk_overlap || (total + len > chunk_size && total > 0) {
                        match current.pop_front() {
                            Some((_, front_len)) => total -= front_len,
                            None => break,
                        }
                    }
                }
            }
            current.push_back((piece, len));
            total += len;
        }
        push_joined(&mut docs, &current);
        docs
    }

    fn read_file_content(&self, file_path: &Path) -> Result<String> {
        match fs::read_to_string(file_path) {
            Ok(content) => Ok(content),
            Err(_) => Ok(String::from_utf8_lossy(&fs::read(file_path)?).to_string()),
        }
    }

    fn list_txt_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut txt_files = Vec::new();
        for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
            let path = entry.path(); if path.extension().and_then(|s| s.to_str()) == Some("txt") { txt_files.push(path.to_path_buf()); }
        }
        txt_files.sort(); txt_files
    }
}

/// Collapse whitespace runs to one space, then drop everything except ASCII
/// letters, digits, whitespace and `. , ; : - ( ) & %`.
pub fn clean_text(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || matches!(c, '.' | ',' | ';' | ':' | '-' | '(' | ')' | '&' | '%'))
        .collect::<String>()
        .trim()
        .to_string()
}

fn char_len(s: &str) -> usize { s.chars().count() }

fn push_joined(docs: &mut Vec<String>, current: &VecDeque<(&str, usize)>) {
    let joined: String = current.iter().map(|(p, _)| *p).collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        docs.push(trimmed.to_string());
    }
}

/// Split on `sep`, attaching each separator to the start of the piece after it.
/// Empty pieces are dropped; an empty separator splits into characters.
fn split_keeping_separator<'a>(text: &'a str, sep: &str) -> Vec<&'a str> {
    if sep.is_empty() {
        return text.char_indices().map(|(i, c)| &text[i..i + c.len_utf8()]).collect();
    }
    let mut pieces = Vec::new();
    let mut start = 0;
    for (pos, _) in text.match_indices(sep) {
        if pos > start {
            pieces.push(&text[start..pos]);
        }
        start = pos;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces.retain(|p| !p.is_empty());
    pieces
}
