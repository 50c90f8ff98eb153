use serde::{Deserialize, Serialize};

use super::graph::NodeKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    Document,
    Chunk,
    Entity,
}

impl From<NodeKind> for EvidenceKind {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Document => Self::Document,
            NodeKind::Chunk => Self::Chunk,
            NodeKind::Entity => Self::Entity,
        }
    }
}

/// Something the engine can return as supporting evidence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub id: String,
    pub kind: EvidenceKind,
    pub label: Option<String>,
}

/// Where a result item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    Vector,
    GraphAugmented,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vector => "vector",
            Self::GraphAugmented => "graph-augmented",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEvidence {
    pub item: EvidenceItem,
    pub score: f64,
    pub provenance: Provenance,
    /// For graph-augmented items, the vector hit they were expanded from.
    pub origin: Option<String>,
}
