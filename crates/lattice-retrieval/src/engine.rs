//! The retrieval orchestrator.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use lattice_cache::{CacheSet, SearchKey};
use lattice_core::config::{ObservabilityConfig, RetrievalConfig};
use lattice_core::errors::{LatticeError, LatticeResult, RetrievalError};
use lattice_core::models::{AvailabilityState, SearchResult};
use lattice_core::traits::{IEmbeddingProvider, IGraphStore, IVectorIndex};
use lattice_health::HealthMonitor;
use lattice_observability::metrics::QueryOutcomeKind;
use lattice_observability::tracing_setup::events;
use lattice_observability::{QueryLog, QueryLogEntry, RetrievalMetrics};

use crate::expansion::expand_one_hop;
use crate::merge::{graph_evidence, merge_ranked, vector_evidence};
use crate::normalize::normalize_query;

/// Whether the answer came from the search-result cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CacheProvenance {
    #[serde(rename = "cache-hit")]
    Hit,
    #[serde(rename = "cache-miss")]
    Miss,
}

/// A result plus how it was produced.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievalOutcome {
    pub query_id: String,
    pub result: SearchResult,
    pub cache: CacheProvenance,
    /// Availability the query was answered under.
    pub availability: AvailabilityState,
    /// Graph expansion ran for this query.
    pub graph_attempted: bool,
    /// Graph expansion hit its deadline or had failing calls.
    pub graph_truncated: bool,
    pub latency: Duration,
}

/// Everything the engine needs, built by the caller. Nothing is read from
/// the environment.
pub struct EngineComponents {
    pub retrieval: RetrievalConfig,
    pub observability: ObservabilityConfig,
    pub embedder: Arc<dyn IEmbeddingProvider>,
    pub index: Arc<dyn IVectorIndex>,
    pub graph: Arc<dyn IGraphStore>,
    pub health: Arc<HealthMonitor>,
    pub caches: CacheSet,
    /// Where [`RetrievalEngine::checkpoint_index`] writes. `None` disables
    /// checkpoints.
    pub index_path: Option<PathBuf>,
}

struct Computed {
    result: SearchResult,
    graph_attempted: bool,
    graph_truncated: bool,
}

/// Answers queries. Cheap to share behind an `Arc`; every method takes
/// `&self`.
pub struct RetrievalEngine {
    config: RetrievalConfig,
    embedder: Arc<dyn IEmbeddingProvider>,
    index: Arc<dyn IVectorIndex>,
    graph: Arc<dyn IGraphStore>,
    health: Arc<HealthMonitor>,
    caches: CacheSet,
    index_path: Option<PathBuf>,
    metrics: Mutex<RetrievalMetrics>,
    query_log: Mutex<QueryLog>,
    checkpoint_failures: AtomicU64,
    last_checkpoint_ok: AtomicBool,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl RetrievalEngine {
    pub fn new(parts: EngineComponents) -> Self {
        Self {
            config: parts.retrieval,
            embedder: parts.embedder,
            index: parts.index,
            graph: parts.graph,
            health: parts.health,
            caches: parts.caches,
            index_path: parts.index_path,
            metrics: Mutex::new(RetrievalMetrics::new(parts.observability.latency_window)),
            query_log: Mutex::new(QueryLog::with_capacity(parts.observability.query_log_capacity)),
            checkpoint_failures: AtomicU64::new(0),
            last_checkpoint_ok: AtomicBool::new(true),
        }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn index(&self) -> &Arc<dyn IVectorIndex> {
        &self.index
    }

    pub fn graph(&self) -> &Arc<dyn IGraphStore> {
        &self.graph
    }

    pub fn health(&self) -> &Arc<HealthMonitor> {
        &self.health
    }

    pub fn caches(&self) -> &CacheSet {
        &self.caches
    }

    pub fn embedder(&self) -> &Arc<dyn IEmbeddingProvider> {
        &self.embedder
    }

    /// Ranked evidence for `query`.
    pub async fn retrieve(&self, query: &str, k: usize) -> LatticeResult<SearchResult> {
        let outcome = self
            .retrieve_detailed(query, k, &CancellationToken::new())
            .await?;
        Ok(outcome.result)
    }

    /// Like [`retrieve`](Self::retrieve) but reports cache provenance and
    /// graph behavior, and stops promptly once `cancel` fires.
    pub async fn retrieve_detailed(
        &self,
        query: &str,
        k: usize,
        cancel: &CancellationToken,
    ) -> LatticeResult<RetrievalOutcome> {
        let query_id = uuid::Uuid::new_v4().to_string();
        let normalized = match self.validate(query, k) {
            Ok(normalized) => normalized,
            Err(e) => {
                lock(&self.metrics).record_validation_failure();
                return Err(e);
            }
        };

        let span = lattice_observability::retrieval_span!(query_id, k);
        let run = self.run(&query_id, &normalized, k).instrument(span);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                lock(&self.metrics).record_cancellation();
                tracing::debug!(query_id = %query_id, "query cancelled");
                Err(RetrievalError::Cancelled { query_id }.into())
            }
            outcome = run => outcome,
        }
    }

    fn validate(&self, query: &str, k: usize) -> LatticeResult<String> {
        if k == 0 || k > self.config.max_k {
            return Err(RetrievalError::InvalidK {
                k,
                max: self.config.max_k,
            }
            .into());
        }
        let normalized = normalize_query(query);
        if normalized.is_empty() {
            return Err(RetrievalError::EmptyQuery.into());
        }
        Ok(normalized)
    }

    async fn run(
        &self,
        query_id: &str,
        normalized: &str,
        k: usize,
    ) -> LatticeResult<RetrievalOutcome> {
        let started = Instant::now();
        let availability = self.health.state();
        let key = SearchKey::new(normalized, k, availability);

        if let Some(result) = self.caches.search.get(&key).await {
            let outcome = RetrievalOutcome {
                query_id: query_id.to_string(),
                result,
                cache: CacheProvenance::Hit,
                availability,
                graph_attempted: false,
                graph_truncated: false,
                latency: started.elapsed(),
            };
            self.record(normalized, k, &outcome);
            return Ok(outcome);
        }

        let computed = self.compute(query_id, normalized, k, availability).await?;
        // Partial or empty answers are recomputed next time.
        if !computed.graph_truncated && !computed.result.is_empty() {
            self.caches.search.put(&key, &computed.result).await;
        }

        let outcome = RetrievalOutcome {
            query_id: query_id.to_string(),
            result: computed.result,
            cache: CacheProvenance::Miss,
            availability,
            graph_attempted: computed.graph_attempted,
            graph_truncated: computed.graph_truncated,
            latency: started.elapsed(),
        };
        self.record(normalized, k, &outcome);
        Ok(outcome)
    }

    async fn embed(&self, normalized: &str) -> LatticeResult<Vec<f32>> {
        let model = self.embedder.name().to_string();
        if let Some(embedding) = self.caches.embedding.get(&model, normalized).await {
            return Ok(embedding);
        }
        if !self.embedder.is_available() {
            return Err(RetrievalError::EmbeddingFailed {
                reason: format!("embedding provider {model} unavailable"),
            }
            .into());
        }
        let embedding = self.embedder.embed(normalized).map_err(|e| match e {
            e if e.is_validation() => e,
            other => LatticeError::from(RetrievalError::EmbeddingFailed {
                reason: other.to_string(),
            }),
        })?;
        self.caches.embedding.put(&model, normalized, &embedding).await;
        Ok(embedding)
    }

    async fn compute(
        &self,
        query_id: &str,
        normalized: &str,
        k: usize,
        availability: AvailabilityState,
    ) -> LatticeResult<Computed> {
        if self.index.is_empty() {
            return Ok(Computed {
                result: SearchResult::empty(availability),
                graph_attempted: false,
                graph_truncated: false,
            });
        }

        let embedding = self.embed(normalized).await?;
        let fetch = k.saturating_mul(self.config.overfetch_factor.max(1));
        let hits = self.index.query(&embedding, fetch)?;
        let vector = vector_evidence(&hits);

        let mut candidates = vector.clone();
        let mut graph_attempted = false;
        let mut graph_truncated = false;

        if availability.allows_graph() && !vector.is_empty() {
            graph_attempted = true;
            let width = self.config.expansion_width(k).min(vector.len());
            let origins = &vector[..width];
            let span = lattice_observability::graph_expansion_span!(width, availability);
            let expansion = expand_one_hop(
                self.graph.as_ref(),
                origins,
                self.config.expansion_concurrency,
                self.config.expansion_timeout(),
            )
            .instrument(span)
            .await;

            for (i, subgraph) in &expansion.expansions {
                candidates.extend(graph_evidence(&origins[*i], subgraph, self.config.graph_discount));
            }

            if expansion.had_problems() {
                graph_truncated = true;
                let cause = match (&expansion.first_error, expansion.truncated) {
                    (_, true) => "deadline".to_string(),
                    (Some(e), false) => e.to_string(),
                    (None, false) => "unknown".to_string(),
                };
                events::graph_expansion_truncated(
                    query_id,
                    expansion.completed,
                    expansion.planned,
                    &cause,
                );
                lock(&self.metrics).record_expansion_problem(expansion.truncated);
                // Availability only moves on probe results; ask for one now.
                self.health.request_probe();
            }
        }

        Ok(Computed {
            result: SearchResult {
                items: merge_ranked(candidates, k),
                availability,
                generated_at: Utc::now(),
            },
            graph_attempted,
            graph_truncated,
        })
    }

    fn record(&self, normalized: &str, k: usize, outcome: &RetrievalOutcome) {
        let graph_augmented = outcome.result.graph_augmented_count();
        let kind = match outcome.cache {
            CacheProvenance::Hit => QueryOutcomeKind::CacheHit,
            CacheProvenance::Miss if graph_augmented > 0 => QueryOutcomeKind::GraphAugmented,
            CacheProvenance::Miss => QueryOutcomeKind::VectorOnly,
        };
        lock(&self.metrics).record_query(kind, outcome.result.len(), outcome.latency);
        lock(&self.query_log).record(QueryLogEntry {
            query_id: outcome.query_id.clone(),
            query: normalized.to_string(),
            k,
            result_count: outcome.result.len(),
            graph_augmented,
            cache_hit: outcome.cache == CacheProvenance::Hit,
            availability: outcome.availability,
            latency: outcome.latency,
            timestamp_epoch_ms: Utc::now().timestamp_millis(),
        });
        tracing::debug!(
            query_id = %outcome.query_id,
            cache = ?outcome.cache,
            results = outcome.result.len(),
            graph_augmented,
            availability = %outcome.availability,
            latency_us = outcome.latency.as_micros() as u64,
            "query answered"
        );
    }

    /// Persist the vector index to its configured path. Failures are logged
    /// and counted, never raised: the in-memory index keeps serving.
    pub fn checkpoint_index(&self) -> bool {
        let Some(path) = self.index_path.as_deref() else {
            return false;
        };
        let display = path.display().to_string();
        match self.index.persist(path) {
            Ok(()) => {
                events::index_persisted(&display, self.index.len(), self.index.backend_name());
                self.last_checkpoint_ok.store(true, Ordering::Release);
                true
            }
            Err(e) => {
                events::index_persist_failed(&display, &e.to_string());
                self.checkpoint_failures.fetch_add(1, Ordering::Relaxed);
                self.last_checkpoint_ok.store(false, Ordering::Release);
                false
            }
        }
    }

    pub fn checkpoint_failures(&self) -> u64 {
        self.checkpoint_failures.load(Ordering::Relaxed)
    }

    pub fn last_checkpoint_ok(&self) -> bool {
        self.last_checkpoint_ok.load(Ordering::Acquire)
    }

    pub fn metrics_snapshot(&self) -> lattice_observability::metrics::RetrievalMetricsSnapshot {
        lock(&self.metrics).snapshot()
    }

    /// Most recent queries, newest first.
    pub fn recent_queries(&self, n: usize) -> Vec<QueryLogEntry> {
        lock(&self.query_log).recent(n)
    }
}
