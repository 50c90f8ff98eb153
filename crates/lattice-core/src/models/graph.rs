use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Document,
    Chunk,
    Entity,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Chunk => "chunk",
            Self::Entity => "entity",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "document" => Some(Self::Document),
            "chunk" => Some(Self::Chunk),
            "entity" => Some(Self::Entity),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            properties: BTreeMap::new(),
        }
    }
}

/// A typed, directed edge. `mentions` links chunks to entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub source: String,
    pub target: String,
    pub rel_type: String,
    pub confidence: Option<f64>,
}

impl Relationship {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        rel_type: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            rel_type: rel_type.into(),
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn touches(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

/// An extracted entity as produced by the extraction collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub name: String,
    pub entity_type: String,
}

/// Traversal request: start from `start_ids`, follow edges in either
/// direction, keep only what passes the filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphPattern {
    pub start_ids: Vec<String>,
    /// Empty means any relationship type.
    #[serde(default)]
    pub rel_types: Vec<String>,
    /// Empty means any node kind.
    #[serde(default)]
    pub node_kinds: Vec<NodeKind>,
    /// Edges with a confidence below this are not followed. Edges without
    /// a confidence always pass.
    #[serde(default)]
    pub min_confidence: f64,
}

impl GraphPattern {
    pub fn from_start(id: impl Into<String>) -> Self {
        Self {
            start_ids: vec![id.into()],
            ..Default::default()
        }
    }

    pub fn allows_edge(&self, rel: &Relationship) -> bool {
        let type_ok = self.rel_types.is_empty() || self.rel_types.iter().any(|t| *t == rel.rel_type);
        let conf_ok = rel.confidence.map_or(true, |c| c >= self.min_confidence);
        type_ok && conf_ok
    }

    pub fn allows_kind(&self, kind: NodeKind) -> bool {
        self.node_kinds.is_empty() || self.node_kinds.contains(&kind)
    }
}

/// Nodes reached by a traversal (start nodes excluded) and the edges walked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subgraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<Relationship>,
}

impl Subgraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Highest confidence among edges joining `a` and `b`, reading an
    /// unscored edge as fully confident. `None` only when no edge joins them.
    pub fn confidence_between(&self, a: &str, b: &str) -> Option<f64> {
        self.edges
            .iter()
            .filter(|e| e.touches(a, b))
            .map(|e| e.confidence.unwrap_or(1.0))
            .fold(None, |acc: Option<f64>, c| Some(acc.map_or(c, |m| m.max(c))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_filters_by_type_and_confidence() {
        let mut p = GraphPattern::from_start("c1");
        p.rel_types = vec!["mentions".into()];
        p.min_confidence = 0.5;

        assert!(p.allows_edge(&Relationship::new("c1", "e1", "mentions")));
        assert!(p.allows_edge(&Relationship::new("c1", "e1", "mentions").with_confidence(0.9)));
        assert!(!p.allows_edge(&Relationship::new("c1", "e1", "mentions").with_confidence(0.2)));
        assert!(!p.allows_edge(&Relationship::new("c1", "e1", "cites")));
    }

    #[test]
    fn confidence_between_takes_max_in_either_direction() {
        let sg = Subgraph {
            nodes: vec![],
            edges: vec![
                Relationship::new("a", "b", "x").with_confidence(0.3),
                Relationship::new("b", "a", "y").with_confidence(0.8),
                Relationship::new("a", "c", "x"),
            ],
        };
        assert_eq!(sg.confidence_between("a", "b"), Some(0.8));
        assert_eq!(sg.confidence_between("a", "c"), Some(1.0));
        assert_eq!(sg.confidence_between("b", "c"), None);
    }

    #[test]
    fn unscored_edge_outranks_a_weak_scored_one() {
        let sg = Subgraph {
            nodes: vec![],
            edges: vec![
                Relationship::new("c1", "e1", "mentions").with_confidence(0.3),
                Relationship::new("e1", "c1", "cites"),
            ],
        };
        assert_eq!(sg.confidence_between("c1", "e1"), Some(1.0));
    }
}
