use std::collections::{BTreeMap, HashMap};

use hrrag_core::config::RetrievalSettings;
use hrrag_core::error::{Error, Result};
use hrrag_core::traits::LexicalScorer;

use crate::tokenize::tokenize;

/// BM25 Okapi constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
    /// Terms with negative IDF are scored with `epsilon * average_idf`.
    pub epsilon: f64,
}

impl Default for Bm25Params {
    fn default() -> Self { Self { k1: 1.5, b: 0.75, epsilon: 0.25 } }
}

impl From<&RetrievalSettings> for Bm25Params {
    fn from(s: &RetrievalSettings) -> Self {
        Self { k1: s.bm25_k1, b: s.bm25_b, epsilon: s.bm25_epsilon }
    }
}

/// Term statistics for every chunk. Document `i` is chunk id `i`.
#[derive(Debug, Clone)]
pub struct Bm25Index {
    params: Bm25Params,
    doc_freqs: Vec<HashMap<String, u32>>,
    doc_len: Vec<usize>,
    avgdl: f64,
    idf: HashMap<String, f64>,
}

impl Bm25Index {
    pub fn build<S: AsRef<str>>(tokenized: &[Vec<S>], params: Bm25Params) -> Result<Self> {
        if tokenized.is_empty() {
            return Err(Error::EmptyIndex("lexical index needs at least one document".to_string()));
        }
        let mut doc_freqs = Vec::with_capacity(tokenized.len());
        let mut doc_len = Vec::with_capacity(tokenized.len());
        // BTreeMap keeps the IDF average summed in a fixed order across runs.
        let mut df: BTreeMap<String, usize> = BTreeMap::new();
        let mut total_len = 0usize;
        for doc in tokenized {
            let mut tf: HashMap<String, u32> = HashMap::new();
            for token in doc {
                *tf.entry(token.as_ref().to_string()).or_insert(0) += 1;
            }
            for term in tf.keys() {
                *df.entry(term.clone()).or_insert(0) += 1;
            }
            total_len += doc.len();
            doc_len.push(doc.len());
            doc_freqs.push(tf);
        }
        let avgdl = total_len as f64 / tokenized.len() as f64;
        let idf = compute_idf(&df, tokenized.len(), params.epsilon);
        tracing::info!(documents = tokenized.len(), terms = idf.len(), avgdl, "built lexical index");
        Ok(Self { params, doc_freqs, doc_len, avgdl, idf })
    }

    /// Tokenize each text with [`tokenize`] and build.
    pub fn from_texts<'a, I>(texts: I, params: Bm25Params) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let tokenized: Vec<Vec<&str>> = texts.into_iter().map(tokenize).collect();
        Self::build(&tokenized, params)
    }

    /// One score per document, in document order. Query tokens missing from the
    /// corpus add nothing; repeated tokens add once per repetition.
    pub fn score(&self, query_tokens: &[&str]) -> Vec<f64> {
        let Bm25Params { k1, b, .. } = self.params;
        let mut scores = vec![0.0f64; self.doc_freqs.len()];
        for q in query_tokens {
            let Some(&idf) = self.idf.get(*q) else { continue };
            for (i, tf_map) in self.doc_freqs.iter().enumerate() {
                // tf == 0 contributes exactly zero; skipping also avoids 0/0 when avgdl is 0.
                let Some(&tf) = tf_map.get(*q) else { continue };
                let tf = f64::from(tf);
                let norm = k1 * (1.0 - b + b * self.doc_len[i] as f64 / self.avgdl);
                scores[i] += idf * (tf * (k1 + 1.0) / (tf + norm));
            }
        }
        scores
    }

    pub fn idf(&self, term: &str) -> Option<f64> { self.idf.get(term).copied() }
    pub fn avgdl(&self) -> f64 { self.avgdl }
    pub fn params(&self) -> Bm25Params { self.params }
    pub fn len(&self) -> usize { self.doc_freqs.len() }
    pub fn is_empty(&self) -> bool { self.doc_freqs.is_empty() }
}

impl LexicalScorer for Bm25Index {
    fn len(&self) -> usize { self.doc_freqs.len() }
    fn score_query(&self, query: &str) -> Vec<f64> { self.score(&tokenize(query)) }
}

fn compute_idf(df: &BTreeMap<String, usize>, n_docs: usize, epsilon: f64) -> HashMap<String, f64> {
    let n = n_docs as f64;
    let mut idf = HashMap::with_capacity(df.len());
    let mut idf_sum = 0.0;
    let mut negative = Vec::new();
    for (term, &freq) in df {
        let freq = freq as f64;
        let value = (n - freq + 0.5).ln() - (freq + 0.5).ln();
        idf_sum += value;
        if value < 0.0 {
            negative.push(term.clone());
        }
        idf.insert(term.clone(), value);
    }
    let average_idf = if idf.is_empty() { 0.0 } else { idf_sum / idf.len() as f64 };
    // A corpus where most terms are everywhere has a negative average; keep scores >= 0.
    let floor = (epsilon * average_idf).max(0.0);
    for term in negative {
        idf.insert(term, floor);
    }
    idf
}
