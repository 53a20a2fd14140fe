//! hrrag-text
//!
//! In-memory BM25 (Okapi) scoring over chunk texts. The index is cheap to
//! derive from the chunk store, so it is rebuilt at process start rather than
//! persisted.

pub mod bm25;
pub mod tokenize;

pub use bm25::{Bm25Index, Bm25Params};
pub use tokenize::tokenize;
