//! Corpus and query fixtures shared by integration tests across crates.
//!
//! The corpus is a small knowledge base: documents, their chunks, extracted
//! entities and the relationships between them, plus golden queries with the
//! chunk ids they are expected to surface.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::PathBuf;

use lattice_core::models::{Chunk, Document, Entity, GraphNode, NodeKind, Relationship};

/// `corpus/` inside this crate, wherever the calling test runs from.
fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("corpus")
}

/// Parse one corpus file, e.g. `"chunks.json"`, into `T`.
///
/// # Panics
/// When the file is missing or its JSON does not match `T`.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("corpus file {} unreadable: {e}", path.display()));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("corpus file {} does not parse: {e}", path.display()))
}

/// Whether `relative_path` names a file under the corpus directory.
pub fn fixture_exists(relative_path: &str) -> bool {
    fixtures_root().join(relative_path).exists()
}

/// Absolute path of a corpus file, for tests that read or copy it directly.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

/// A golden query and the chunk ids that must appear in its top `k`.
#[derive(Debug, Clone, Deserialize)]
pub struct GoldenQuery {
    pub query: String,
    pub k: usize,
    pub expected_in_top_k: Vec<String>,
}

/// The whole knowledge base.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub documents: Vec<Document>,
    pub chunks: Vec<Chunk>,
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
}

impl Corpus {
    pub fn load() -> Self {
        Self {
            documents: load_fixture("documents.json"),
            chunks: load_fixture("chunks.json"),
            entities: load_fixture("entities.json"),
            relationships: load_fixture("relationships.json"),
        }
    }

    /// Graph nodes for every document, chunk and entity. Chunk labels are
    /// their text; entity nodes carry their type as a property.
    pub fn graph_nodes(&self) -> Vec<GraphNode> {
        let docs = self
            .documents
            .iter()
            .map(|d| GraphNode::new(&d.id, NodeKind::Document, &d.content));
        let chunks = self
            .chunks
            .iter()
            .map(|c| GraphNode::new(&c.id, NodeKind::Chunk, &c.text));
        let entities = self.entities.iter().map(|e| {
            let mut node = GraphNode::new(&e.id, NodeKind::Entity, &e.name);
            node.properties
                .insert("entity_type".to_string(), e.entity_type.clone());
            node
        });
        docs.chain(chunks).chain(entities).collect()
    }

    pub fn chunk(&self, id: &str) -> Option<&Chunk> {
        self.chunks.iter().find(|c| c.id == id)
    }
}

/// The golden queries from `queries.json`, in file order.
pub fn golden_queries() -> Vec<GoldenQuery> {
    load_fixture("queries.json")
}
