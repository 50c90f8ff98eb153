#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use lattice_cache::CacheSet;
use lattice_core::config::{CacheConfig, HealthConfig, ObservabilityConfig, RetrievalConfig};
use lattice_core::traits::{IEmbeddingProvider, IGraphStore, IVectorIndex};
use lattice_graph::InMemoryGraphStore;
use lattice_health::HealthMonitor;
use lattice_retrieval::{EngineComponents, HashingEmbedder, RetrievalEngine};
use lattice_vector::FlatVectorIndex;
use test_fixtures::Corpus;

pub const DIMS: usize = 256;

pub struct Harness {
    pub engine: Arc<RetrievalEngine>,
    pub graph: Arc<InMemoryGraphStore>,
    pub health: Arc<HealthMonitor>,
    pub corpus: Corpus,
}

/// Knobs for [`seeded_engine_from`]. Chunks are always indexed with a
/// [`HashingEmbedder`]; `embedder` only replaces the query-side provider.
#[derive(Default)]
pub struct HarnessOptions {
    pub health: HealthConfig,
    pub index_path: Option<PathBuf>,
    pub embedder: Option<Arc<dyn IEmbeddingProvider>>,
}

/// An engine over an empty index and graph.
pub fn empty_engine() -> Harness {
    build(Corpus::load(), false, HarnessOptions::default())
}

/// An engine with every corpus chunk indexed and the corpus graph loaded.
pub async fn seeded_engine() -> Harness {
    seeded_engine_with(HealthConfig::default()).await
}

pub async fn seeded_engine_with(health: HealthConfig) -> Harness {
    seeded_engine_from(HarnessOptions {
        health,
        ..HarnessOptions::default()
    })
    .await
}

pub async fn seeded_engine_from(options: HarnessOptions) -> Harness {
    let h = build(Corpus::load(), true, options);
    for node in h.corpus.graph_nodes() {
        h.graph.upsert_node(&node).await.unwrap();
    }
    for rel in &h.corpus.relationships {
        h.graph.upsert_relationship(rel).await.unwrap();
    }
    h
}

fn build(corpus: Corpus, index_chunks: bool, options: HarnessOptions) -> Harness {
    let embedder = HashingEmbedder::new(DIMS);
    let index = FlatVectorIndex::new(4_096);
    if index_chunks {
        for chunk in &corpus.chunks {
            let v = embedder.embed(&chunk.text).unwrap();
            index.add(&chunk.id, &v).unwrap();
        }
    }

    let graph = Arc::new(InMemoryGraphStore::new());
    let health = Arc::new(HealthMonitor::new(&options.health));
    let retrieval = RetrievalConfig {
        embedding_dimensions: DIMS,
        ..RetrievalConfig::default()
    };

    let engine = Arc::new(RetrievalEngine::new(EngineComponents {
        retrieval,
        observability: ObservabilityConfig::default(),
        embedder: options.embedder.unwrap_or_else(|| Arc::new(embedder)),
        index: Arc::new(index) as Arc<dyn IVectorIndex>,
        graph: Arc::clone(&graph) as Arc<dyn IGraphStore>,
        health: Arc::clone(&health),
        caches: CacheSet::from_config(&CacheConfig::default()),
        index_path: options.index_path,
    }));

    Harness {
        engine,
        graph,
        health,
        corpus,
    }
}
