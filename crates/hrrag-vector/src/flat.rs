use hrrag_core::error::{Error, Result};
use hrrag_core::store::ChunkStore;
use hrrag_core::traits::VectorSearch;
use hrrag_core::types::DenseHit;

/// Exact nearest-neighbour index over squared Euclidean distance. Row `i` is
/// chunk id `i`; vectors are stored contiguously, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatL2Index {
    pub(crate) dim: usize,
    pub(crate) len: usize,
    pub(crate) data: Vec<f32>,
}

impl FlatL2Index {
    pub fn build<V: AsRef<[f32]>>(vectors: &[V]) -> Result<Self> {
        let first = vectors.first().ok_or_else(|| Error::EmptyIndex("cannot build a vector index from zero vectors".to_string()))?;
        let dim = first.as_ref().len();
        if dim == 0 {
            return Err(Error::DimensionMismatch { context: "vector 0".to_string(), expected: 1, actual: 0 });
        }
        let mut data = Vec::with_capacity(dim * vectors.len());
        for (row, v) in vectors.iter().enumerate() {
            let v = v.as_ref();
            if v.len() != dim {
                return Err(Error::DimensionMismatch { context: format!("vector {row}"), expected: dim, actual: v.len() });
            }
            data.extend_from_slice(v);
        }
        tracing::info!(population = vectors.len(), dim, "built vector index");
        Ok(Self { dim, len: vectors.len(), data })
    }

    pub fn from_store(store: &ChunkStore) -> Result<Self> {
        let rows: Vec<&[f32]> = store.vectors().collect();
        Self::build(&rows)
    }

    /// The `min(k, len)` nearest rows, closest first. Equal distances keep id order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<DenseHit>> {
        if self.len == 0 {
            return Err(Error::EmptyIndex("vector index has no rows".to_string()));
        }
        if query.len() != self.dim {
            return Err(Error::DimensionMismatch { context: "query".to_string(), expected: self.dim, actual: query.len() });
        }
        let k = k.min(self.len);
        if k == 0 {
            return Ok(Vec::new());
        }
        let mut hits: Vec<DenseHit> = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(id, row)| DenseHit { distance: squared_l2(query, row), id })
            .collect();
        let order = |a: &DenseHit, b: &DenseHit| a.distance.total_cmp(&b.distance).then(a.id.cmp(&b.id));
        if k < hits.len() {
            hits.select_nth_unstable_by(k - 1, order);
            hits.truncate(k);
        }
        hits.sort_unstable_by(order);
        Ok(hits)
    }

    pub fn len(&self) -> usize { self.len }
    pub fn is_empty(&self) -> bool { self.len == 0 }
    pub fn dim(&self) -> usize { self.dim }
}

impl VectorSearch for FlatL2Index {
    fn len(&self) -> usize { self.len }
    fn dim(&self) -> usize { self.dim }
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<DenseHit>> { FlatL2Index::search(self, query, k) }
}

pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| { let d = x - y; d * d }).sum()
}
