//! Offline build steps: source document to chunk store, chunk store to vector index.

use std::path::Path;

use anyhow::Context;

use hrrag_core::config::Settings;
use hrrag_core::data_processor::{ChunkingConfig, DataProcessor};
use hrrag_core::traits::Embedder;
use hrrag_core::ChunkStore;
use hrrag_vector::{FlatL2Index, StoreWriter};

/// Load, clean, chunk and embed the source document, then save the chunk store.
/// `source` overrides `data.source_path`.
pub fn ingest(settings: &Settings, source: Option<&Path>, embedder: &dyn Embedder, show_progress: bool) -> anyhow::Result<ChunkStore> {
    let processor = DataProcessor::with_config(ChunkingConfig::from(&settings.ingest))?;
    let source = source.map_or_else(|| settings.data.source_path(), Path::to_path_buf);
    let raw = processor.load_source(&source).with_context(|| format!("reading source {}", source.display()))?;
    let chunks = processor.process_text(&raw);
    let store = StoreWriter::new(embedder, settings.ingest.embed_batch_size).with_progress(show_progress).embed_chunks(chunks)?;
    let store_path = settings.data.store_path();
    store.save(&store_path).with_context(|| format!("saving chunk store {}", store_path.display()))?;
    Ok(store)
}

/// Build the exact L2 index over the saved chunk store and persist it.
pub fn build_index(settings: &Settings) -> anyhow::Result<FlatL2Index> {
    let store_path = settings.data.store_path();
    let store = ChunkStore::load(&store_path).with_context(|| format!("loading chunk store {}", store_path.display()))?;
    let index = FlatL2Index::from_store(&store)?;
    let index_path = settings.data.index_path();
    index.persist(&index_path).with_context(|| format!("writing vector index {}", index_path.display()))?;
    tracing::info!(population = index.len(), "total vectors indexed");
    Ok(index)
}
