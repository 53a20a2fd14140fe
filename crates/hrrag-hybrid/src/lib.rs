//! Hybrid retrieval: dense nearest-neighbour candidates re-scored with BM25.
//!
//! The vector index proposes `top_k` candidates, the lexical index scores the
//! whole corpus in parallel, and [`HybridRanker`] fuses the two for the
//! candidates only.

pub mod context;
pub mod fusion;
pub mod retriever;

pub use context::{open_service, RetrievalContext, RetrievalService};
pub use fusion::HybridRanker;
pub use retriever::HybridRetriever;
