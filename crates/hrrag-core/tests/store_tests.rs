use std::fs;
use tempfile::TempDir;

use hrrag_core::{ChunkStore, Error};

fn sample_store() -> ChunkStore {
    ChunkStore::from_parts(
        vec!["annual leave".to_string(), "sick leave".to_string(), "dress code".to_string()],
        vec![vec![0.1, 0.2], vec![0.3, 0.4], vec![-0.5, 1.0e-7]],
    )
    .expect("store")
}

#[test]
fn ids_are_dense_positions() {
    let store = sample_store();
    assert_eq!(store.len(), 3);
    assert_eq!(store.dim(), 2);
    for (i, c) in store.chunks().iter().enumerate() { assert_eq!(c.id, i); }
    assert_eq!(store.get(1).map(|c| c.text.as_str()), Some("sick leave"));
    assert!(store.get(3).is_none());
}

#[test]
fn save_then_load_preserves_order_and_values() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("nested/store.json");
    let store = sample_store();
    store.save(&path).expect("save");
    let loaded = ChunkStore::load(&path).expect("load");
    assert_eq!(loaded.chunks(), store.chunks());
}

#[test]
fn mismatched_counts_are_corrupt() {
    let err = ChunkStore::from_parts(vec!["a".to_string(), "b".to_string()], vec![vec![1.0]]).err().expect("must fail");
    assert!(matches!(err, Error::CorruptStore(_)));
}

#[test]
fn ragged_dimensions_are_corrupt() {
    let err = ChunkStore::from_parts(vec!["a".to_string(), "b".to_string()], vec![vec![1.0, 2.0], vec![1.0]])
        .err()
        .expect("must fail");
    assert!(matches!(err, Error::CorruptStore(ref m) if m.contains("vector 1")), "got {err:?}");
}

#[test]
fn load_rejects_persisted_count_mismatch() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("store.json");
    fs::write(&path, r#"{"chunks": ["a", "b"], "embeddings": [[1.0, 2.0]]}"#).unwrap();
    let err = ChunkStore::load(&path).err().expect("must fail");
    assert!(matches!(err, Error::CorruptStore(_)));
}

#[test]
fn load_rejects_garbage() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("store.json");
    fs::write(&path, b"not json").unwrap();
    assert!(matches!(ChunkStore::load(&path), Err(Error::CorruptStore(_))));
}
