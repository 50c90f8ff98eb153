//! In-process graph store.

mod indexed;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;

use lattice_core::errors::GraphError;
use lattice_core::models::{GraphNode, GraphPattern, Relationship, Subgraph};
use lattice_core::traits::IGraphStore;

pub use indexed::{EdgeData, IndexedGraph};

use crate::traversal;

/// Petgraph-backed [`IGraphStore`].
///
/// Besides serving single-process deployments it can simulate an outage
/// ([`set_offline`](Self::set_offline)) or a slow backend
/// ([`set_latency`](Self::set_latency)), which is how the degradation paths
/// are exercised without a real database.
#[derive(Debug, Default)]
pub struct InMemoryGraphStore {
    graph: RwLock<IndexedGraph>,
    offline: AtomicBool,
    latency_ms: AtomicU64,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails with [`GraphError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    /// Delay added before every call.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn node_count(&self) -> usize {
        self.read().node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.read().edge_count()
    }

    pub fn remove_node(&self, id: &str) -> Option<GraphNode> {
        self.write().remove_node(id)
    }

    async fn enter(&self) -> Result<(), GraphError> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.is_offline() {
            return Err(GraphError::Unavailable {
                reason: "in-memory graph store is offline".to_string(),
            });
        }
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexedGraph> {
        self.graph.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexedGraph> {
        self.graph.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl IGraphStore for InMemoryGraphStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn upsert_node(&self, node: &GraphNode) -> Result<(), GraphError> {
        self.enter().await?;
        self.write().upsert_node(node);
        Ok(())
    }

    async fn upsert_relationship(&self, rel: &Relationship) -> Result<(), GraphError> {
        self.enter().await?;
        match self.write().upsert_edge(rel) {
            Some(_) => Ok(()),
            None => Err(GraphError::QueryFailed {
                reason: format!(
                    "relationship {} -[{}]-> {} references a missing node",
                    rel.source, rel.rel_type, rel.target
                ),
            }),
        }
    }

    async fn query(&self, pattern: &GraphPattern, depth: usize) -> Result<Subgraph, GraphError> {
        traversal::validate_pattern(pattern, depth)?;
        self.enter().await?;
        let graph = self.read();
        Ok(traversal::bfs(&graph, pattern, depth))
    }

    async fn ping(&self) -> Result<(), GraphError> {
        self.enter().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_core::models::NodeKind;

    async fn seeded() -> InMemoryGraphStore {
        let store = InMemoryGraphStore::new();
        store.upsert_node(&GraphNode::new("c1", NodeKind::Chunk, "c1")).await.unwrap();
        store.upsert_node(&GraphNode::new("e1", NodeKind::Entity, "e1")).await.unwrap();
        store
            .upsert_relationship(&Relationship::new("c1", "e1", "mentions"))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn query_returns_neighbors() {
        let store = seeded().await;
        let sg = store.query(&GraphPattern::from_start("c1"), 1).await.unwrap();
        assert_eq!(sg.nodes.len(), 1);
        assert_eq!(sg.nodes[0].id, "e1");
    }

    #[tokio::test]
    async fn offline_is_an_error_not_an_empty_result() {
        let store = seeded().await;
        store.set_offline(true);
        let err = store.query(&GraphPattern::from_start("c1"), 1).await.unwrap_err();
        assert!(matches!(err, GraphError::Unavailable { .. }));
        assert!(store.ping().await.is_err());

        store.set_offline(false);
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn dangling_relationship_is_rejected() {
        let store = seeded().await;
        let err = store
            .upsert_relationship(&Relationship::new("c1", "missing", "mentions"))
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::QueryFailed { .. }));
        assert_eq!(store.edge_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn latency_delays_calls() {
        let store = seeded().await;
        store.set_latency(Duration::from_millis(300));
        let started = tokio::time::Instant::now();
        store.ping().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(300));
    }
}
