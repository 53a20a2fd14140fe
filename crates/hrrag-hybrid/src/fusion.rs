use std::cmp::Ordering;

use hrrag_core::types::{DenseHit, FusionPolicy, FusionWeights, ScoredCandidate};

/// Combines vector-index candidates with their lexical scores.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HybridRanker { policy: FusionPolicy, weights: FusionWeights }

impl HybridRanker {
    pub fn new(policy: FusionPolicy, weights: FusionWeights) -> Self { Self { policy, weights } }
    pub fn policy(&self) -> FusionPolicy { self.policy }
    pub fn weights(&self) -> FusionWeights { self.weights }
    pub fn with_policy(self, policy: FusionPolicy) -> Self { Self { policy, ..self } }

    /// Score and order `dense` hits. `lexical[id]` is the lexical score of chunk `id`;
    /// chunks that are not dense hits are never ranked.
    pub fn fuse(&self, dense: &[DenseHit], lexical: &[f64]) -> Vec<ScoredCandidate> {
        let lex = |id: usize| lexical.get(id).copied().unwrap_or(0.0);
        let FusionWeights { dense: wd, lexical: wl } = self.weights;
        let mut out: Vec<ScoredCandidate> = match self.policy {
            FusionPolicy::Direct => dense
                .iter()
                .map(|h| {
                    let l = lex(h.id);
                    ScoredCandidate { chunk_id: h.id, dense_distance: h.distance, lexical_score: l, fused_score: wd * direct_similarity(h.distance) + wl * l }
                })
                .collect(),
            FusionPolicy::Normalized => {
                let dense_col = min_max(&dense.iter().map(|h| -f64::from(h.distance)).collect::<Vec<_>>());
                let lex_col = min_max(&dense.iter().map(|h| lex(h.id)).collect::<Vec<_>>());
                dense
                    .iter()
                    .zip(dense_col.iter().zip(&lex_col))
                    .map(|(h, (nd, nl))| ScoredCandidate { chunk_id: h.id, dense_distance: h.distance, lexical_score: lex(h.id), fused_score: wd * nd + wl * nl })
                    .collect()
            }
        };
        out.sort_by(rank_order);
        out
    }
}

/// `1 / (1 + distance)`: 1 at distance 0, strictly decreasing.
pub fn direct_similarity(distance: f32) -> f64 { 1.0 / (1.0 + f64::from(distance)) }

/// Scale into `[0, 1]` by the column's min and max. A constant column maps to zeros.
pub fn min_max(values: &[f64]) -> Vec<f64> {
    let (lo, hi) = values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    let range = hi - lo;
    if !range.is_finite() || range <= 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - lo) / range).collect()
}

/// Higher fused score first; equal scores by ascending chunk id.
pub fn rank_order(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.fused_score.total_cmp(&a.fused_score).then(a.chunk_id.cmp(&b.chunk_id))
}
