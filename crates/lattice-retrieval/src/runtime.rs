//! Startup and shutdown wiring.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use lattice_cache::CacheSet;
use lattice_core::errors::LatticeResult;
use lattice_core::traits::IEmbeddingProvider;
use lattice_core::LatticeConfig;
use lattice_graph::{create_graph_store, ResilientGraphStore};
use lattice_health::{spawn_probe_loop, HealthMonitor};
use lattice_observability::tracing_setup::init_tracing;

use crate::{EngineComponents, HashingEmbedder, OpsSurface, RetrievalEngine};

/// A running engine: query handle, operator handle, and the probe task.
pub struct LatticeRuntime {
    pub engine: Arc<RetrievalEngine>,
    pub ops: Arc<OpsSurface>,
    pub graph: Arc<ResilientGraphStore>,
    persist_on_shutdown: bool,
    cancel: CancellationToken,
    probe_task: JoinHandle<()>,
}

impl LatticeRuntime {
    /// Validate `config`, build every component, load the vector index and
    /// start the health probe loop. Must run inside a tokio runtime.
    ///
    /// An index file that exists but cannot be read is fatal; a missing one
    /// starts empty. `embedder` defaults to [`HashingEmbedder`].
    pub async fn start(
        config: LatticeConfig,
        embedder: Option<Arc<dyn IEmbeddingProvider>>,
    ) -> LatticeResult<Self> {
        config.validate()?;
        init_tracing(&config.observability);

        let caches = CacheSet::from_config(&config.cache);
        let index = lattice_vector::open_index(&config.vector)?;
        let graph = create_graph_store(&config.graph)?;
        let health = Arc::new(HealthMonitor::new(&config.health));
        let embedder = embedder.unwrap_or_else(|| {
            Arc::new(HashingEmbedder::new(config.retrieval.embedding_dimensions))
        });

        let cancel = CancellationToken::new();
        let probe_task = spawn_probe_loop(
            Arc::clone(&health),
            graph.clone(),
            cancel.child_token(),
        );

        let engine = Arc::new(RetrievalEngine::new(EngineComponents {
            retrieval: config.retrieval.clone(),
            observability: config.observability.clone(),
            embedder,
            index,
            graph: graph.clone(),
            health,
            caches,
            index_path: config.vector.path.as_ref().map(PathBuf::from),
        }));
        let ops = Arc::new(
            OpsSurface::new(Arc::clone(&engine), config.observability.alert_window_secs)
                .with_graph_stats(Arc::clone(&graph)),
        );

        tracing::info!(
            version = lattice_core::constants::VERSION,
            cache = %config.cache.backend,
            vector = %config.vector.backend,
            graph = %config.graph.backend,
            vectors = engine.index().len(),
            forced_vector_only = config.health.force_vector_only,
            "lattice runtime started"
        );

        Ok(Self {
            engine,
            ops,
            graph,
            persist_on_shutdown: config.vector.persist_on_shutdown,
            cancel,
            probe_task,
        })
    }

    /// Stop the probe loop and, when configured, checkpoint the index.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.probe_task.await {
            tracing::warn!(error = %e, "health probe task ended abnormally");
        }
        if self.persist_on_shutdown {
            self.engine.checkpoint_index();
        }
        tracing::info!("lattice runtime stopped");
    }
}
