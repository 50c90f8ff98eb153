use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Retrieval orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Largest `k` a caller may request.
    pub max_k: usize,
    /// Vector candidates fetched per requested result.
    pub overfetch_factor: usize,
    /// Multiplier applied to the originating vector score for graph evidence.
    pub graph_discount: f64,
    /// Vector candidates expanded through the graph. `None` means `k`.
    pub expansion_top_n: Option<usize>,
    /// Deadline for the whole graph expansion step.
    pub expansion_timeout_ms: u64,
    /// Concurrent one-hop graph calls per query.
    pub expansion_concurrency: usize,
    /// Dimensionality of the built-in hashing embedder.
    pub embedding_dimensions: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_k: defaults::DEFAULT_MAX_K,
            overfetch_factor: defaults::DEFAULT_OVERFETCH_FACTOR,
            graph_discount: defaults::DEFAULT_GRAPH_DISCOUNT,
            expansion_top_n: None,
            expansion_timeout_ms: defaults::DEFAULT_EXPANSION_TIMEOUT_MS,
            expansion_concurrency: defaults::DEFAULT_EXPANSION_CONCURRENCY,
            embedding_dimensions: defaults::DEFAULT_EMBEDDING_DIMENSIONS,
        }
    }
}

impl RetrievalConfig {
    pub fn expansion_timeout(&self) -> Duration {
        Duration::from_millis(self.expansion_timeout_ms)
    }

    /// Number of vector candidates to expand for a request of size `k`.
    pub fn expansion_width(&self, k: usize) -> usize {
        self.expansion_top_n.unwrap_or(k)
    }
}
