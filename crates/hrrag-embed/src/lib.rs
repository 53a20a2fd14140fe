//! Embedding providers: a local candle sentence encoder, an HTTP client for a
//! remote embedding service, and a deterministic fake for tests.

pub mod device;
pub mod fake;
pub mod local;
pub mod pool;
pub mod remote;
pub mod tokenize;

use hrrag_core::config::{EmbeddingBackend, EmbeddingSettings};
use hrrag_core::error::{Error, Result};
use hrrag_core::traits::Embedder;

pub use fake::FakeEmbedder;
pub use local::MiniLmEmbedder;
pub use pool::masked_mean_l2;
pub use remote::RemoteEmbedder;

/// `APP_USE_FAKE_EMBEDDINGS=1` (or `true`) forces the fake provider regardless of config.
pub fn fake_embeddings_forced() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

pub fn get_default_embedder(settings: &EmbeddingSettings) -> Result<Box<dyn Embedder>> {
    if fake_embeddings_forced() || settings.provider == EmbeddingBackend::Fake {
        tracing::info!(dim = settings.dim, "using fake embedder");
        return Ok(Box::new(FakeEmbedder::new(settings.dim)));
    }
    let embedder: Box<dyn Embedder> = match settings.provider {
        EmbeddingBackend::Local => Box::new(MiniLmEmbedder::load(&settings.model_dir(), settings.max_len)?),
        EmbeddingBackend::Remote => {
            let url = settings
                .remote_url
                .clone()
                .ok_or_else(|| Error::InvalidConfig("embedding.remote_url is required for the remote provider".to_string()))?;
            tracing::info!(%url, "using remote embedder");
            Box::new(RemoteEmbedder::new(url, settings.dim, settings.max_len, settings.timeout()))
        }
        EmbeddingBackend::Fake => Box::new(FakeEmbedder::new(settings.dim)),
    };
    if embedder.dim() != settings.dim {
        return Err(Error::InvalidConfig(format!("embedding.dim is {} but the model produces {}", settings.dim, embedder.dim())));
    }
    Ok(embedder)
}
