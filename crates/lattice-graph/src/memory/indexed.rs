use std::collections::HashMap;

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};

use lattice_core::models::{GraphNode, Relationship};

/// Edge weight: the relationship minus its endpoints, which the graph
/// already knows.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeData {
    pub rel_type: String,
    pub confidence: Option<f64>,
}

/// StableGraph plus an id lookup. StableGraph keeps indices valid across
/// removals, so `node_index` never needs rebuilding.
#[derive(Debug, Default)]
pub struct IndexedGraph {
    pub graph: StableGraph<GraphNode, EdgeData, Directed>,
    pub node_index: HashMap<String, NodeIndex>,
}

impl IndexedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a node, keeping its index and edges.
    pub fn upsert_node(&mut self, node: &GraphNode) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(&node.id) {
            if let Some(weight) = self.graph.node_weight_mut(idx) {
                *weight = node.clone();
            }
            return idx;
        }
        let idx = self.graph.add_node(node.clone());
        self.node_index.insert(node.id.clone(), idx);
        idx
    }

    /// Insert or update a `(source, rel_type, target)` edge. Returns `None`
    /// when either endpoint is missing.
    pub fn upsert_edge(&mut self, rel: &Relationship) -> Option<EdgeIndex> {
        let src = *self.node_index.get(&rel.source)?;
        let dst = *self.node_index.get(&rel.target)?;

        let existing = self
            .graph
            .edges_directed(src, Direction::Outgoing)
            .find(|e| e.target() == dst && e.weight().rel_type == rel.rel_type)
            .map(|e| e.id());

        let data = EdgeData {
            rel_type: rel.rel_type.clone(),
            confidence: rel.confidence,
        };
        match existing {
            Some(edge) => {
                if let Some(weight) = self.graph.edge_weight_mut(edge) {
                    *weight = data;
                }
                Some(edge)
            }
            None => Some(self.graph.add_edge(src, dst, data)),
        }
    }

    pub fn get_node(&self, id: &str) -> Option<NodeIndex> {
        self.node_index.get(id).copied()
    }

    /// Remove a node and all its edges.
    pub fn remove_node(&mut self, id: &str) -> Option<GraphNode> {
        let idx = self.node_index.remove(id)?;
        self.graph.remove_node(idx)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Rebuild a [`Relationship`] from an edge.
    pub fn relationship(&self, edge: EdgeIndex) -> Option<Relationship> {
        let (src, dst) = self.graph.edge_endpoints(edge)?;
        let data = self.graph.edge_weight(edge)?;
        Some(Relationship {
            source: self.graph[src].id.clone(),
            target: self.graph[dst].id.clone(),
            rel_type: data.rel_type.clone(),
            confidence: data.confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_core::models::NodeKind;

    #[test]
    fn upsert_node_keeps_index() {
        let mut g = IndexedGraph::new();
        let a = g.upsert_node(&GraphNode::new("a", NodeKind::Chunk, "first"));
        let again = g.upsert_node(&GraphNode::new("a", NodeKind::Chunk, "renamed"));
        assert_eq!(a, again);
        assert_eq!(g.node_count(), 1);
        assert_eq!(g.graph[a].label, "renamed");
    }

    #[test]
    fn upsert_edge_updates_confidence_in_place() {
        let mut g = IndexedGraph::new();
        g.upsert_node(&GraphNode::new("a", NodeKind::Chunk, "a"));
        g.upsert_node(&GraphNode::new("b", NodeKind::Entity, "b"));

        let e1 = g.upsert_edge(&Relationship::new("a", "b", "mentions").with_confidence(0.2));
        let e2 = g.upsert_edge(&Relationship::new("a", "b", "mentions").with_confidence(0.9));
        assert_eq!(e1, e2);
        assert_eq!(g.edge_count(), 1);

        let rel = g.relationship(e1.unwrap()).unwrap();
        assert_eq!(rel.confidence, Some(0.9));

        g.upsert_edge(&Relationship::new("a", "b", "cites"));
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn edge_to_missing_node_is_rejected() {
        let mut g = IndexedGraph::new();
        g.upsert_node(&GraphNode::new("a", NodeKind::Chunk, "a"));
        assert!(g.upsert_edge(&Relationship::new("a", "ghost", "mentions")).is_none());
    }

    #[test]
    fn remove_node_drops_edges() {
        let mut g = IndexedGraph::new();
        g.upsert_node(&GraphNode::new("a", NodeKind::Chunk, "a"));
        g.upsert_node(&GraphNode::new("b", NodeKind::Entity, "b"));
        g.upsert_edge(&Relationship::new("a", "b", "mentions"));

        assert!(g.remove_node("b").is_some());
        assert_eq!(g.edge_count(), 0);
        assert!(g.get_node("b").is_none());
    }
}
