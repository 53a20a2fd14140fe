use hrrag_core::config::Settings;
use hrrag_core::error::{Error, Result};
use hrrag_core::store::ChunkStore;
use hrrag_core::traits::Embedder;
use hrrag_embed::get_default_embedder;
use hrrag_text::{Bm25Index, Bm25Params};
use hrrag_vector::FlatL2Index;

use crate::fusion::HybridRanker;
use crate::retriever::HybridRetriever;

pub type RetrievalService = HybridRetriever<FlatL2Index, Bm25Index>;

/// Everything loaded once at startup: the chunk store, the persisted vector
/// index and a lexical index rebuilt from the chunk texts.
pub struct RetrievalContext {
    pub store: ChunkStore,
    pub vector: FlatL2Index,
    pub lexical: Bm25Index,
}

impl RetrievalContext {
    pub fn open(settings: &Settings) -> Result<Self> {
        let store = ChunkStore::load(&settings.data.store_path())?;
        let index_path = settings.data.index_path();
        if !index_path.exists() {
            return Err(Error::NotFound(format!("vector index {} (run `hrrag build-index`)", index_path.display())));
        }
        let vector = FlatL2Index::load(&index_path)?;
        let lexical = Bm25Index::from_texts(store.texts(), Bm25Params::from(&settings.retrieval))?;
        Ok(Self { store, vector, lexical })
    }

    /// Build both indexes in memory from an existing store.
    pub fn from_store(store: ChunkStore, params: Bm25Params) -> Result<Self> {
        let vector = FlatL2Index::from_store(&store)?;
        let lexical = Bm25Index::from_texts(store.texts(), params)?;
        Ok(Self { store, vector, lexical })
    }

    pub fn into_service(self, embedder: Box<dyn Embedder>, ranker: HybridRanker) -> Result<RetrievalService> {
        HybridRetriever::new(self.store, self.vector, self.lexical, embedder, ranker)
    }
}

/// Open the context and wire in the configured embedder and fusion policy.
pub fn open_service(settings: &Settings) -> Result<RetrievalService> {
    let context = RetrievalContext::open(settings)?;
    let embedder = get_default_embedder(&settings.embedding)?;
    let ranker = HybridRanker::new(settings.retrieval.fusion, settings.retrieval.weights);
    context.into_service(embedder, ranker)
}
