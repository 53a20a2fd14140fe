//! Client for an HTTP embedding service speaking the text-embeddings-inference
//! `/embed` shape: `{"inputs": [..]}` in, `[[f32, ..], ..]` out.

use std::time::{Duration, Instant};

use hrrag_core::error::{Error, Result};
use hrrag_core::traits::{check_deadline, Embedder};
use serde::Serialize;

#[derive(Serialize)]
struct EmbedRequest<'a> { inputs: &'a [String] }

pub struct RemoteEmbedder {
    url: String,
    dim: usize,
    max_len: usize,
    timeout: Duration,
}

impl RemoteEmbedder {
    pub fn new(url: impl Into<String>, dim: usize, max_len: usize, timeout: Duration) -> Self {
        Self { url: url.into(), dim, max_len, timeout }
    }

    pub fn url(&self) -> &str { &self.url }

    fn post(&self, texts: &[String], timeout: Duration) -> Result<Vec<Vec<f32>>> {
        // A blocking client owns its own runtime, so one is built per call and
        // never outlives the blocking thread that made it.
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Embedding(format!("failed to build HTTP client: {e}")))?;
        let resp = client
            .post(&self.url)
            .json(&EmbedRequest { inputs: texts })
            .send()
            .map_err(|e| Error::Embedding(if e.is_timeout() { format!("embedding request timed out: {e}") } else { format!("embedding service unreachable: {e}") }))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(Error::Embedding(format!("embedding service returned {status}: {body}")));
        }
        let vectors: Vec<Vec<f32>> = resp.json().map_err(|e| Error::Embedding(format!("malformed embedding response: {e}")))?;
        if vectors.len() != texts.len() {
            return Err(Error::Embedding(format!("sent {} inputs, got {} vectors", texts.len(), vectors.len())));
        }
        if let Some(v) = vectors.iter().find(|v| v.len() != self.dim) {
            return Err(Error::Embedding(format!("expected dimension {}, service returned {}", self.dim, v.len())));
        }
        Ok(vectors)
    }
}

impl Embedder for RemoteEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { self.max_len }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() { return Ok(Vec::new()); }
        self.post(texts, self.timeout)
    }

    fn embed_query(&self, text: &str, deadline: Option<Instant>) -> Result<Vec<f32>> {
        check_deadline(deadline)?;
        let timeout = match deadline {
            Some(d) => d.saturating_duration_since(Instant::now()).min(self.timeout),
            None => self.timeout,
        };
        let mut out = self.post(&[text.to_string()], timeout)?;
        tracing::debug!(url = %self.url, ?timeout, "embedded query remotely");
        Ok(out.remove(0))
    }
}
