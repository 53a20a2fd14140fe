//! Chunk store: the ordered `(text, vector)` pairs produced by ingestion.
//!
//! On disk this is one JSON object with two parallel arrays, `chunks` and
//! `embeddings`. Position in those arrays is the chunk id, so the file must be
//! loaded back in exactly the order it was written. The store is read-only once
//! loaded; a changed source document means a new store.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Chunk, ChunkId};

#[derive(Deserialize)]
struct StoreFile {
    chunks: Vec<String>,
    embeddings: Vec<Vec<f32>>,
}

#[derive(Serialize)]
struct StoreFileRef<'a> {
    chunks: Vec<&'a str>,
    embeddings: Vec<&'a [f32]>,
}

#[derive(Debug, Clone)]
pub struct ChunkStore {
    chunks: Vec<Chunk>,
    dim: usize,
}

impl ChunkStore {
    /// Pair texts with vectors. Counts must match and every vector must have the
    /// same non-zero length.
    pub fn from_parts(texts: Vec<String>, vectors: Vec<Vec<f32>>) -> Result<Self> {
        if texts.len() != vectors.len() {
            return Err(Error::CorruptStore(format!("{} chunk texts but {} vectors", texts.len(), vectors.len())));
        }
        let dim = vectors.first().map_or(0, Vec::len);
        if !vectors.is_empty() && dim == 0 {
            return Err(Error::CorruptStore("vectors have zero length".to_string()));
        }
        if let Some((row, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != dim) {
            return Err(Error::CorruptStore(format!("vector {} has dimension {}, expected {}", row, v.len(), dim)));
        }
        let chunks = texts
            .into_iter()
            .zip(vectors)
            .enumerate()
            .map(|(id, (text, vector))| Chunk { id, text, vector })
            .collect();
        Ok(Self { chunks, dim })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let file: StoreFile = serde_json::from_slice(&bytes)
            .map_err(|e| Error::CorruptStore(format!("{}: {}", path.display(), e)))?;
        let store = Self::from_parts(file.chunks, file.embeddings)
            .map_err(|e| match e {
                Error::CorruptStore(msg) => Error::CorruptStore(format!("{}: {}", path.display(), msg)),
                other => other,
            })?;
        tracing::info!(path = %path.display(), chunks = store.len(), dim = store.dim, "loaded chunk store");
        Ok(store)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = StoreFileRef {
            chunks: self.chunks.iter().map(|c| c.text.as_str()).collect(),
            embeddings: self.chunks.iter().map(|c| c.vector.as_slice()).collect(),
        };
        write_atomic(path, &serde_json::to_vec(&file)?)?;
        tracing::info!(path = %path.display(), chunks = self.len(), "saved chunk store");
        Ok(())
    }

    pub fn len(&self) -> usize { self.chunks.len() }
    pub fn is_empty(&self) -> bool { self.chunks.is_empty() }
    /// Vector dimensionality; 0 for an empty store.
    pub fn dim(&self) -> usize { self.dim }
    pub fn get(&self, id: ChunkId) -> Option<&Chunk> { self.chunks.get(id) }
    pub fn chunks(&self) -> &[Chunk] { &self.chunks }
    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ { self.chunks.iter().map(|c| c.text.as_str()) }
    pub fn vectors(&self) -> impl Iterator<Item = &[f32]> + '_ { self.chunks.iter().map(|c| c.vector.as_slice()) }
}

/// Write `bytes` to a temp file next to `path`, then rename it over `path`, so a
/// reader never observes a half-written file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
