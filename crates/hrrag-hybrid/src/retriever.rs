use std::time::Instant;

use hrrag_core::error::{Error, Result};
use hrrag_core::store::ChunkStore;
use hrrag_core::traits::{Embedder, LexicalScorer, VectorSearch};
use hrrag_core::types::ScoredCandidate;

use crate::fusion::HybridRanker;

/// Query-time retrieval over one immutable snapshot of the store and both
/// indexes. Holds no per-query state, so a single instance can be shared
/// behind an `Arc` by any number of threads.
pub struct HybridRetriever<VI, LI> where VI: VectorSearch, LI: LexicalScorer {
    store: ChunkStore,
    vector: VI,
    lexical: LI,
    embedder: Box<dyn Embedder>,
    ranker: HybridRanker,
}

impl<VI, LI> HybridRetriever<VI, LI> where VI: VectorSearch, LI: LexicalScorer {
    /// Fails with `CorruptStore` unless the store, the vector index and the
    /// lexical index all hold the same number of chunks.
    pub fn new(store: ChunkStore, vector: VI, lexical: LI, embedder: Box<dyn Embedder>, ranker: HybridRanker) -> Result<Self> {
        if vector.len() != store.len() || lexical.len() != store.len() {
            return Err(Error::CorruptStore(format!(
                "store has {} chunks but vector index has {} rows and lexical index has {} documents",
                store.len(), vector.len(), lexical.len()
            )));
        }
        if !store.is_empty() && store.dim() != vector.dim() {
            return Err(Error::CorruptStore(format!("store vectors have dimension {} but the vector index has {}", store.dim(), vector.dim())));
        }
        if embedder.dim() != vector.dim() {
            return Err(Error::DimensionMismatch { context: "embedder".to_string(), expected: vector.dim(), actual: embedder.dim() });
        }
        tracing::info!(chunks = store.len(), dim = vector.dim(), policy = ?ranker.policy(), "retrieval service ready");
        Ok(Self { store, vector, lexical, embedder, ranker })
    }

    /// Top `top_k` chunk texts, best first.
    pub fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<String>> { self.retrieve_within(query, top_k, None) }

    pub fn retrieve_within(&self, query: &str, top_k: usize, deadline: Option<Instant>) -> Result<Vec<String>> {
        Ok(self.texts_for(&self.retrieve_scored(query, top_k, deadline)?))
    }

    pub fn retrieve_scored(&self, query: &str, top_k: usize, deadline: Option<Instant>) -> Result<Vec<ScoredCandidate>> {
        self.retrieve_scored_with(&self.ranker, query, top_k, deadline)
    }

    /// Same as [`retrieve_scored`](Self::retrieve_scored) with a caller-chosen ranker.
    pub fn retrieve_scored_with(&self, ranker: &HybridRanker, query: &str, top_k: usize, deadline: Option<Instant>) -> Result<Vec<ScoredCandidate>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }
        let start = Instant::now();
        let query_vec = self.embedder.embed_query(query, deadline)?;
        if query_vec.len() != self.vector.dim() {
            return Err(Error::Embedding(format!("query embedding has dimension {}, index expects {}", query_vec.len(), self.vector.dim())));
        }
        let (dense, lexical) = rayon::join(|| self.vector.search(&query_vec, top_k), || self.lexical.score_query(query));
        let ranked = ranker.fuse(&dense?, &lexical);
        tracing::debug!(top_k, returned = ranked.len(), elapsed = ?start.elapsed(), "retrieved");
        Ok(ranked)
    }

    pub fn texts_for(&self, ranked: &[ScoredCandidate]) -> Vec<String> {
        ranked.iter().filter_map(|c| self.store.get(c.chunk_id)).map(|c| c.text.clone()).collect()
    }

    pub fn store(&self) -> &ChunkStore { &self.store }
    pub fn ranker(&self) -> &HybridRanker { &self.ranker }
    pub fn len(&self) -> usize { self.store.len() }
    pub fn is_empty(&self) -> bool { self.store.is_empty() }
}
