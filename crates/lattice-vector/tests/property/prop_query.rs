use lattice_core::errors::VectorError;
use lattice_core::traits::IVectorIndex;
use lattice_vector::FlatVectorIndex;
use proptest::prelude::*;

fn vectors(dims: usize) -> impl Strategy<Value = Vec<Vec<f32>>> {
    proptest::collection::vec(proptest::collection::vec(-10.0f32..10.0, dims), 0..60)
}

proptest! {
    #[test]
    fn query_returns_at_most_k_in_ascending_distance(
        vs in vectors(4),
        q in proptest::collection::vec(-10.0f32..10.0, 4),
        k in 1usize..20,
    ) {
        let index = FlatVectorIndex::new(16);
        for (i, v) in vs.iter().enumerate() {
            index.add(&format!("v{i}"), v).unwrap();
        }
        let hits = index.query(&q, k).unwrap();
        prop_assert!(hits.len() <= k);
        prop_assert!(hits.len() <= vs.len());
        for w in hits.windows(2) {
            prop_assert!(w[0].distance <= w[1].distance);
        }
    }

    #[test]
    fn wrong_length_add_leaves_index_unchanged(
        vs in vectors(3).prop_filter("non-empty", |v| !v.is_empty()),
        bad_len in (1usize..8).prop_filter("differs", |n| *n != 3),
    ) {
        let index = FlatVectorIndex::new(usize::MAX);
        for (i, v) in vs.iter().enumerate() {
            index.add(&format!("v{i}"), v).unwrap();
        }
        let before = index.export();
        let err = index.add("intruder", &vec![1.0; bad_len]).unwrap_err();
        let is_mismatch = matches!(err, VectorError::DimensionMismatch { expected: 3, .. });
        prop_assert!(is_mismatch);
        prop_assert_eq!(index.export(), before);
    }
}
