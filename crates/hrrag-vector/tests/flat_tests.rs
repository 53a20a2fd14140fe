use hrrag_core::traits::VectorSearch;
use hrrag_core::Error;
use hrrag_vector::{squared_l2, FlatL2Index};

/// Deterministic pseudo-random rows (xorshift), so failures reproduce.
fn rows(n: usize, dim: usize, seed: u64) -> Vec<Vec<f32>> {
    let mut s = seed.max(1);
    (0..n)
        .map(|_| {
            (0..dim)
                .map(|_| {
                    s ^= s << 13; s ^= s >> 7; s ^= s << 17;
                    (s % 1000) as f32 / 1000.0 - 0.5
                })
                .collect()
        })
        .collect()
}

#[test]
fn returns_min_k_population_in_ascending_order() {
    let data = rows(37, 8, 7);
    let index = FlatL2Index::build(&data).expect("build");
    let query = rows(1, 8, 99).remove(0);
    for k in [0usize, 1, 5, 36, 37, 38, 500] {
        let hits = index.search(&query, k).expect("search");
        assert_eq!(hits.len(), k.min(37), "k={k}");
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance), "k={k} not ascending");
    }
}

#[test]
fn top_hits_agree_with_brute_force() {
    let data = rows(50, 6, 3);
    let index = FlatL2Index::build(&data).expect("build");
    let query = rows(1, 6, 4).remove(0);
    let mut expected: Vec<(f32, usize)> = data.iter().enumerate().map(|(i, v)| (squared_l2(&query, v), i)).collect();
    expected.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    let hits = index.search(&query, 10).expect("search");
    let got: Vec<usize> = hits.iter().map(|h| h.id).collect();
    let want: Vec<usize> = expected.iter().take(10).map(|e| e.1).collect();
    assert_eq!(got, want);
}

#[test]
fn distance_is_squared_euclidean() {
    let index = FlatL2Index::build(&[vec![0.0f32, 0.0], vec![3.0, 4.0]]).expect("build");
    let hits = index.search(&[0.0, 0.0], 2).expect("search");
    assert_eq!(hits[0].id, 0);
    assert_eq!(hits[0].distance, 0.0);
    assert_eq!(hits[1].distance, 25.0);
}

#[test]
fn equal_distances_break_by_ascending_id() {
    let data = vec![vec![1.0f32, 0.0], vec![0.0, 1.0], vec![-1.0, 0.0], vec![0.0, -1.0]];
    let index = FlatL2Index::build(&data).expect("build");
    let ids: Vec<usize> = index.search(&[0.0, 0.0], 4).expect("search").iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3]);
    let ids: Vec<usize> = index.search(&[0.0, 0.0], 2).expect("search").iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![0, 1]);
}

#[test]
fn empty_build_is_rejected() {
    let empty: Vec<Vec<f32>> = Vec::new();
    assert!(matches!(FlatL2Index::build(&empty), Err(Error::EmptyIndex(_))));
}

#[test]
fn ragged_rows_name_the_offending_row() {
    let err = FlatL2Index::build(&[vec![0.0f32; 4], vec![0.0; 4], vec![0.0; 3]]).err().expect("must fail");
    match err {
        Error::DimensionMismatch { context, expected, actual } => {
            assert_eq!(context, "vector 2");
            assert_eq!((expected, actual), (4, 3));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn query_of_wrong_dimension_is_rejected() {
    let index = FlatL2Index::build(&rows(3, 4, 1)).expect("build");
    let err = index.search(&[0.0; 5], 2).err().expect("must fail");
    assert!(matches!(err, Error::DimensionMismatch { expected: 4, actual: 5, .. }), "got {err:?}");
}

#[test]
fn trait_object_dispatches_to_the_index() {
    let index = FlatL2Index::build(&rows(4, 3, 5)).expect("build");
    let dyn_index: &dyn VectorSearch = &index;
    assert_eq!(dyn_index.len(), 4);
    assert_eq!(dyn_index.dim(), 3);
    assert_eq!(dyn_index.search(&[0.0; 3], 2).expect("search"), index.search(&[0.0; 3], 2).expect("search"));
}
