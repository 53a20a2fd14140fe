use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API key missing: set {0}")]
    ApiKeyMissing(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Language model timed out after {0}s")]
    Timeout(u64),

    #[error("Provider error {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("Malformed completion: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, LlmError>;
