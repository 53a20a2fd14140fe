//! Domain types shared by the store, both indexes and the ranker.

use serde::{Deserialize, Serialize};

/// Dense position of a chunk in the store. The vector index row and the
/// lexical document number use the same value.
pub type ChunkId = usize;

/// A span of the source document together with its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub text: String,
    pub vector: Vec<f32>,
}

/// One row returned by the vector index. Lower `distance` is better.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DenseHit {
    pub distance: f32,
    pub id: ChunkId,
}

/// Per-query ranking record; lives only for the duration of one retrieval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub chunk_id: ChunkId,
    pub dense_distance: f32,
    pub lexical_score: f64,
    pub fused_score: f64,
}

/// How dense distances and lexical scores are combined.
///
/// - `Direct`: `w_dense / (1 + distance) + w_lex * bm25`, used when serving.
/// - `Normalized`: both columns min-max scaled over the candidate set first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FusionPolicy {
    #[default]
    Direct,
    Normalized,
}

impl std::str::FromStr for FusionPolicy {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "normalized" | "normalised" => Ok(Self::Normalized),
            other => Err(crate::error::Error::InvalidConfig(format!("unknown fusion policy '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    pub dense: f64,
    pub lexical: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self { dense: 0.6, lexical: 0.4 }
    }
}
