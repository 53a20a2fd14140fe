use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Persisted chunks/vectors disagree with each other or with the index built from them.
    #[error("Corrupt store: {0}")]
    CorruptStore(String),

    /// `context` names the offending input, e.g. `vector 12` or `query`.
    #[error("Dimension mismatch ({context}): expected {expected}, got {actual}")]
    DimensionMismatch { context: String, expected: usize, actual: usize },

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Empty index: {0}")]
    EmptyIndex(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
