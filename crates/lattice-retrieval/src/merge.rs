//! Scoring and hybrid merge.

use std::collections::HashMap;

use lattice_core::models::{
    EvidenceItem, EvidenceKind, GraphNode, Provenance, ScoredEvidence, Subgraph, VectorHit,
};

/// Vector relevance: cosine similarity floored at zero.
pub fn vector_relevance(hit: &VectorHit) -> f64 {
    f64::from(1.0 - hit.distance).max(0.0)
}

pub fn vector_evidence(hits: &[VectorHit]) -> Vec<ScoredEvidence> {
    hits.iter()
        .map(|hit| ScoredEvidence {
            item: EvidenceItem {
                id: hit.id.clone(),
                kind: EvidenceKind::Chunk,
                label: None,
            },
            score: vector_relevance(hit),
            provenance: Provenance::Vector,
            origin: None,
        })
        .collect()
}

/// Graph score: origin relevance × discount × edge confidence (1.0 when the
/// edge carries none). Confidence is clamped to `[0, 1]`, so graph evidence
/// can never outscore the hit it came from.
pub fn graph_score(origin_score: f64, discount: f64, confidence: Option<f64>) -> f64 {
    let confidence = confidence.unwrap_or(1.0).clamp(0.0, 1.0);
    origin_score * discount * confidence
}

/// Evidence for every node reached from `origin`.
pub fn graph_evidence(
    origin: &ScoredEvidence,
    subgraph: &Subgraph,
    discount: f64,
) -> Vec<ScoredEvidence> {
    subgraph
        .nodes
        .iter()
        .filter(|node| node.id != origin.item.id)
        .map(|node: &GraphNode| ScoredEvidence {
            item: EvidenceItem {
                id: node.id.clone(),
                kind: node.kind.into(),
                label: Some(node.label.clone()),
            },
            score: graph_score(
                origin.score,
                discount,
                subgraph.confidence_between(&origin.item.id, &node.id),
            ),
            provenance: Provenance::GraphAugmented,
            origin: Some(origin.item.id.clone()),
        })
        .collect()
}

/// Deduplicate by id keeping the higher score, sort by score descending and
/// truncate to `k`.
///
/// Vector candidates come first in `candidates`; the sort is stable, so equal
/// scores keep vector rank order and vector items keep their relative order
/// no matter what graph evidence is mixed in.
pub fn merge_ranked(candidates: Vec<ScoredEvidence>, k: usize) -> Vec<ScoredEvidence> {
    let mut out: Vec<ScoredEvidence> = Vec::with_capacity(candidates.len());
    let mut position: HashMap<String, usize> = HashMap::new();

    for candidate in candidates {
        match position.get(&candidate.item.id) {
            Some(&i) => {
                if candidate.score > out[i].score {
                    out[i] = candidate;
                }
            }
            None => {
                position.insert(candidate.item.id.clone(), out.len());
                out.push(candidate);
            }
        }
    }

    out.sort_by(|a, b| b.score.total_cmp(&a.score));
    out.truncate(k);
    out
}
