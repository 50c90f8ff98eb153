use lattice_core::models::{EvidenceItem, EvidenceKind, Provenance, ScoredEvidence, VectorHit};
use lattice_retrieval::merge::{graph_score, merge_ranked, vector_evidence};
use proptest::prelude::*;

fn evidence(id: u8, score: f64, provenance: Provenance) -> ScoredEvidence {
    ScoredEvidence {
        item: EvidenceItem {
            id: format!("n{id}"),
            kind: EvidenceKind::Chunk,
            label: None,
        },
        score,
        provenance,
        origin: None,
    }
}

fn candidates() -> impl Strategy<Value = Vec<ScoredEvidence>> {
    prop::collection::vec((0u8..20, 0.0f64..1.0, any::<bool>()), 0..40).prop_map(|raw| {
        raw.into_iter()
            .map(|(id, score, graph)| {
                let provenance = if graph {
                    Provenance::GraphAugmented
                } else {
                    Provenance::Vector
                };
                evidence(id, score, provenance)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn merged_is_bounded_sorted_and_unique(items in candidates(), k in 1usize..30) {
        let merged = merge_ranked(items.clone(), k);
        prop_assert!(merged.len() <= k);
        for pair in merged.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
        let mut ids: Vec<_> = merged.iter().map(|e| e.item.id.clone()).collect();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), merged.len());

        // Each kept id carries the best score seen for it.
        for e in &merged {
            let best = items
                .iter()
                .filter(|c| c.item.id == e.item.id)
                .map(|c| c.score)
                .fold(f64::MIN, f64::max);
            prop_assert_eq!(e.score, best);
        }
    }

    #[test]
    fn vector_order_survives_merge(distances in prop::collection::vec(0.0f32..2.0, 1..20), k in 1usize..25) {
        let hits: Vec<_> = distances
            .iter()
            .enumerate()
            .map(|(i, d)| VectorHit { id: format!("c{i}"), distance: *d })
            .collect();
        let mut sorted = hits.clone();
        sorted.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        let merged = merge_ranked(vector_evidence(&sorted), k);
        let expected: Vec<_> = sorted.iter().take(k).map(|h| h.id.clone()).collect();
        let got: Vec<_> = merged.iter().map(|e| e.item.id.clone()).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn graph_score_never_exceeds_origin(
        origin in 0.0f64..1.0,
        discount in 0.0f64..1.0,
        confidence in prop::option::of(-1.0f64..2.0),
    ) {
        let s = graph_score(origin, discount, confidence);
        prop_assert!(s >= 0.0);
        prop_assert!(s <= origin);
    }
}
