//! Breadth-first pattern traversal over an [`IndexedGraph`].

use std::collections::{HashSet, VecDeque};

use petgraph::stable_graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use lattice_core::constants::MAX_GRAPH_TRAVERSAL_DEPTH;
use lattice_core::errors::GraphError;
use lattice_core::models::{GraphPattern, Subgraph};

use crate::memory::IndexedGraph;

/// Reject patterns no store could answer sensibly.
pub fn validate_pattern(pattern: &GraphPattern, depth: usize) -> Result<(), GraphError> {
    if depth > MAX_GRAPH_TRAVERSAL_DEPTH {
        return Err(GraphError::InvalidPattern {
            reason: format!("depth {depth} exceeds maximum {MAX_GRAPH_TRAVERSAL_DEPTH}"),
        });
    }
    if !pattern.min_confidence.is_finite() {
        return Err(GraphError::InvalidPattern {
            reason: "min_confidence must be finite".to_string(),
        });
    }
    Ok(())
}

/// Walk up to `depth` hops from the pattern's start nodes, following edges
/// in both directions.
///
/// Start nodes are never part of the returned nodes. A node whose kind the
/// pattern excludes is neither returned nor expanded further. Unknown start
/// ids are skipped. Neighbors are visited in edge insertion order so the
/// result is deterministic.
pub fn bfs(graph: &IndexedGraph, pattern: &GraphPattern, depth: usize) -> Subgraph {
    let mut out = Subgraph::default();
    if depth == 0 {
        return out;
    }

    let mut visited: HashSet<NodeIndex> = HashSet::new();
    let mut walked: HashSet<EdgeIndex> = HashSet::new();
    let mut queue: VecDeque<(NodeIndex, usize)> = VecDeque::new();

    for id in &pattern.start_ids {
        if let Some(idx) = graph.get_node(id) {
            if visited.insert(idx) {
                queue.push_back((idx, 0));
            }
        }
    }

    while let Some((current, level)) = queue.pop_front() {
        if level >= depth {
            continue;
        }
        for (edge, neighbor) in incident_edges(graph, current) {
            let Some(rel) = graph.relationship(edge) else {
                continue;
            };
            if !pattern.allows_edge(&rel) {
                continue;
            }
            let node = &graph.graph[neighbor];
            if !pattern.allows_kind(node.kind) {
                continue;
            }
            if walked.insert(edge) {
                out.edges.push(rel);
            }
            if visited.insert(neighbor) {
                out.nodes.push(node.clone());
                queue.push_back((neighbor, level + 1));
            }
        }
    }

    out
}

/// Outgoing and incoming edges of `node` with the node at the other end,
/// ordered by edge index.
fn incident_edges(graph: &IndexedGraph, node: NodeIndex) -> Vec<(EdgeIndex, NodeIndex)> {
    let mut edges: Vec<(EdgeIndex, NodeIndex)> = graph
        .graph
        .edges_directed(node, Direction::Outgoing)
        .map(|e| (e.id(), e.target()))
        .chain(
            graph
                .graph
                .edges_directed(node, Direction::Incoming)
                .map(|e| (e.id(), e.source())),
        )
        .collect();
    edges.sort_by_key(|(e, _)| e.index());
    edges.dedup_by_key(|(e, _)| *e);
    edges
}
