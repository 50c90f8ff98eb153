//! Backend selection.

use std::sync::Arc;

use lattice_core::config::GraphConfig;
use lattice_core::errors::GraphError;
use lattice_core::traits::IGraphStore;

use crate::{InMemoryGraphStore, Neo4jGraphStore, ResilientGraphStore};

/// The configured backend wrapped in a [`ResilientGraphStore`].
pub fn create_graph_store(config: &GraphConfig) -> Result<Arc<ResilientGraphStore>, GraphError> {
    let inner: Arc<dyn IGraphStore> = match config.backend.as_str() {
        "memory" => Arc::new(InMemoryGraphStore::new()),
        "neo4j" => Arc::new(Neo4jGraphStore::new(config)),
        other => {
            return Err(GraphError::Unavailable {
                reason: format!("unknown graph backend {other:?}"),
            })
        }
    };
    tracing::debug!(
        backend = inner.name(),
        pool_size = config.pool_size,
        max_retries = config.max_retries,
        "graph store configured"
    );
    Ok(Arc::new(ResilientGraphStore::from_config(inner, config)))
}
