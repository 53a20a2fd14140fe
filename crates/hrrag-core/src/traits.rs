use std::time::Instant;

use crate::error::{Error, Result};
use crate::types::DenseHit;

pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed one query string. Providers that talk to the network override this
    /// to turn `deadline` into a request timeout; the default only checks it
    /// around the call.
    fn embed_query(&self, text: &str, deadline: Option<Instant>) -> Result<Vec<f32>> {
        check_deadline(deadline)?;
        let mut out = self.embed_batch(&[text.to_string()])?;
        check_deadline(deadline)?;
        if out.len() != 1 {
            return Err(Error::Embedding(format!("expected 1 vector, provider returned {}", out.len())));
        }
        let v = out.remove(0);
        if v.len() != self.dim() {
            return Err(Error::Embedding(format!("expected dimension {}, provider returned {}", self.dim(), v.len())));
        }
        Ok(v)
    }
}

pub fn check_deadline(deadline: Option<Instant>) -> Result<()> {
    match deadline {
        Some(d) if Instant::now() >= d => Err(Error::Embedding("deadline exceeded".to_string())),
        _ => Ok(()),
    }
}

/// Nearest-neighbour lookup over chunk vectors; rows are chunk ids.
pub trait VectorSearch: Send + Sync {
    fn len(&self) -> usize;
    fn dim(&self) -> usize;
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<DenseHit>>;

    fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Scores a raw query against every document; output index is the chunk id.
pub trait LexicalScorer: Send + Sync {
    fn len(&self) -> usize;
    fn score_query(&self, query: &str) -> Vec<f64>;

    fn is_empty(&self) -> bool { self.len() == 0 }
}
