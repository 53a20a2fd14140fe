use indicatif::{ProgressBar, ProgressStyle};

use hrrag_core::error::{Error, Result};
use hrrag_core::store::ChunkStore;
use hrrag_core::traits::Embedder;

/// Embeds chunk texts in batches and pairs them into a [`ChunkStore`].
pub struct StoreWriter<'a> { embedder: &'a dyn Embedder, batch_size: usize, show_progress: bool }

impl<'a> StoreWriter<'a> {
    pub fn new(embedder: &'a dyn Embedder, batch_size: usize) -> Self {
        Self { embedder, batch_size: batch_size.max(1), show_progress: true }
    }

    pub fn with_progress(mut self, show: bool) -> Self { self.show_progress = show; self }

    pub fn embed_chunks(&self, chunks: Vec<String>) -> Result<ChunkStore> {
        if chunks.is_empty() {
            return Err(Error::EmptyIndex("no chunks to embed".to_string()));
        }
        tracing::info!(chunks = chunks.len(), batch_size = self.batch_size, "embedding chunks");
        let pb = if self.show_progress { ProgressBar::new(chunks.len() as u64) } else { ProgressBar::hidden() };
        if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}") {
            pb.set_style(style.progress_chars("#>-"));
        }
        let mut vectors = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(self.batch_size) {
            let embedded = self.embedder.embed_batch(batch)?;
            if embedded.len() != batch.len() {
                pb.abandon();
                return Err(Error::Embedding(format!("sent {} chunks, provider returned {} vectors", batch.len(), embedded.len())));
            }
            vectors.extend(embedded);
            pb.set_position(vectors.len() as u64);
        }
        pb.finish_with_message("embedded");
        ChunkStore::from_parts(chunks, vectors)
    }
}
