//! Query counts by outcome, cache provenance, graph expansion health, latency.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::latency::LatencyWindow;

/// How a completed query was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcomeKind {
    CacheHit,
    VectorOnly,
    GraphAugmented,
}

/// Tracks retrieval effectiveness metrics.
#[derive(Debug, Clone)]
pub struct RetrievalMetrics {
    pub total_queries: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub vector_only_answers: u64,
    pub graph_augmented_answers: u64,
    pub empty_results: u64,
    pub graph_expansion_failures: u64,
    pub graph_expansion_truncations: u64,
    pub validation_failures: u64,
    pub cancellations: u64,
    latency: LatencyWindow,
}

/// Serializable point-in-time copy of [`RetrievalMetrics`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalMetricsSnapshot {
    pub total_queries: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_hit_rate: f64,
    pub vector_only_answers: u64,
    pub graph_augmented_answers: u64,
    pub empty_results: u64,
    pub graph_expansion_failures: u64,
    pub graph_expansion_truncations: u64,
    pub validation_failures: u64,
    pub cancellations: u64,
    pub latency_p50_ms: f64,
    pub latency_p95_ms: f64,
    pub latency_p99_ms: f64,
}

impl RetrievalMetrics {
    pub fn new(latency_window: usize) -> Self {
        Self {
            total_queries: 0,
            cache_hits: 0,
            cache_misses: 0,
            vector_only_answers: 0,
            graph_augmented_answers: 0,
            empty_results: 0,
            graph_expansion_failures: 0,
            graph_expansion_truncations: 0,
            validation_failures: 0,
            cancellations: 0,
            latency: LatencyWindow::new(latency_window),
        }
    }

    /// Record a completed query.
    pub fn record_query(&mut self, kind: QueryOutcomeKind, result_count: usize, latency: Duration) {
        self.total_queries += 1;
        match kind {
            QueryOutcomeKind::CacheHit => self.cache_hits += 1,
            QueryOutcomeKind::VectorOnly => {
                self.cache_misses += 1;
                self.vector_only_answers += 1;
            }
            QueryOutcomeKind::GraphAugmented => {
                self.cache_misses += 1;
                self.graph_augmented_answers += 1;
            }
        }
        if result_count == 0 {
            self.empty_results += 1;
        }
        self.latency.record(latency);
    }

    /// Record a graph expansion that failed or ran out of time.
    pub fn record_expansion_problem(&mut self, truncated: bool) {
        if truncated {
            self.graph_expansion_truncations += 1;
        } else {
            self.graph_expansion_failures += 1;
        }
    }

    pub fn record_validation_failure(&mut self) {
        self.validation_failures += 1;
    }

    pub fn record_cancellation(&mut self) {
        self.cancellations += 1;
    }

    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }

    pub fn latency_percentile(&self, p: f64) -> Duration {
        self.latency.percentile(p)
    }

    pub fn snapshot(&self) -> RetrievalMetricsSnapshot {
        let ms = |d: Duration| d.as_secs_f64() * 1_000.0;
        RetrievalMetricsSnapshot {
            total_queries: self.total_queries,
            cache_hits: self.cache_hits,
            cache_misses: self.cache_misses,
            cache_hit_rate: self.cache_hit_rate(),
            vector_only_answers: self.vector_only_answers,
            graph_augmented_answers: self.graph_augmented_answers,
            empty_results: self.empty_results,
            graph_expansion_failures: self.graph_expansion_failures,
            graph_expansion_truncations: self.graph_expansion_truncations,
            validation_failures: self.validation_failures,
            cancellations: self.cancellations,
            latency_p50_ms: ms(self.latency.percentile(0.50)),
            latency_p95_ms: ms(self.latency.percentile(0.95)),
            latency_p99_ms: ms(self.latency.percentile(0.99)),
        }
    }
}

impl Default for RetrievalMetrics {
    fn default() -> Self {
        Self::new(lattice_core::config::defaults::DEFAULT_LATENCY_WINDOW)
    }
}
