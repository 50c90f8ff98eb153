//! Operator surface: statistics, health, invalidation, override.
//!
//! Nothing on the query path depends on this module.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use lattice_core::models::{CacheKind, CacheStats};
use lattice_core::AvailabilityState;
use lattice_graph::{ResilienceStats, ResilientGraphStore};
use lattice_health::AvailabilityReport;
use lattice_observability::health::derive_overall;
use lattice_observability::metrics::RetrievalMetricsSnapshot;
use lattice_observability::{ComponentHealth, DegradationAlert, HealthStatus, QueryLogEntry};

use crate::RetrievalEngine;

/// Combined health as served to monitoring.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatusReport {
    pub overall: HealthStatus,
    pub availability: AvailabilityReport,
    pub components: Vec<ComponentHealth>,
    pub alerts: Vec<DegradationAlert>,
    pub graph_calls: Option<ResilienceStats>,
    pub generated_at: DateTime<Utc>,
}

pub struct OpsSurface {
    engine: Arc<RetrievalEngine>,
    graph: Option<Arc<ResilientGraphStore>>,
    alert_window_secs: i64,
}

impl OpsSurface {
    pub fn new(engine: Arc<RetrievalEngine>, alert_window_secs: u64) -> Self {
        Self {
            engine,
            graph: None,
            alert_window_secs: i64::try_from(alert_window_secs).unwrap_or(i64::MAX),
        }
    }

    /// Include retry/timeout counters of the resilient graph wrapper.
    pub fn with_graph_stats(mut self, graph: Arc<ResilientGraphStore>) -> Self {
        self.graph = Some(graph);
        self
    }

    pub async fn cache_stats(&self) -> Vec<CacheStats> {
        self.engine.caches().stats().await
    }

    pub async fn health(&self) -> HealthStatusReport {
        let monitor = self.engine.health();
        let availability = monitor.report();
        let mut components = vec![graph_component(&availability)];

        for stats in self.cache_stats().await {
            let name = format!("cache.{}", stats.kind.namespace());
            components.push(if stats.degraded {
                ComponentHealth::new(name, HealthStatus::Degraded)
                    .with_detail(format!("{} backend unreachable, caching bypassed", stats.backend))
            } else {
                ComponentHealth::new(name, HealthStatus::Healthy)
                    .with_detail(format!("{} entries, hit rate {:.2}", stats.size, stats.hit_rate))
            });
        }

        let index = self.engine.index();
        let index_detail = format!("{} vectors ({})", index.len(), index.backend_name());
        components.push(if self.engine.last_checkpoint_ok() {
            ComponentHealth::new("vector_index", HealthStatus::Healthy).with_detail(index_detail)
        } else {
            ComponentHealth::new("vector_index", HealthStatus::Degraded).with_detail(format!(
                "{index_detail}, last checkpoint failed ({} failures)",
                self.engine.checkpoint_failures()
            ))
        });

        HealthStatusReport {
            overall: derive_overall(&components),
            availability,
            components,
            alerts: monitor.alerts(self.alert_window_secs),
            graph_calls: self.graph.as_ref().map(|g| g.stats()),
            generated_at: Utc::now(),
        }
    }

    /// Drop every entry of `kind` whose key starts with `prefix`; an empty
    /// prefix clears the cache. Returns how many entries went.
    pub async fn invalidate(&self, kind: CacheKind, prefix: &str) -> u64 {
        self.engine
            .caches()
            .layer(kind)
            .invalidate_prefix(prefix)
            .await
    }

    /// Returns the previous setting.
    pub fn set_force_vector_only(&self, forced: bool) -> bool {
        self.engine.health().set_forced_vector_only(forced)
    }

    pub fn retrieval_metrics(&self) -> RetrievalMetricsSnapshot {
        self.engine.metrics_snapshot()
    }

    pub fn recent_queries(&self, n: usize) -> Vec<QueryLogEntry> {
        self.engine.recent_queries(n)
    }
}

/// Graph unreachability degrades the service (vector-only answers) rather
/// than making it unhealthy.
fn graph_component(report: &AvailabilityReport) -> ComponentHealth {
    let status = match report.state {
        AvailabilityState::Healthy => HealthStatus::Healthy,
        AvailabilityState::Degraded | AvailabilityState::Unreachable => HealthStatus::Degraded,
    };
    let detail = if report.forced_vector_only {
        "operator forced vector-only mode".to_string()
    } else {
        match &report.last_probe {
            Some(p) if p.success => format!("{}, last probe ok in {}ms", report.state, p.latency_ms),
            Some(p) => format!(
                "{}, last probe failed: {}",
                report.state,
                p.error.as_deref().unwrap_or("unknown error")
            ),
            None => format!("{}, not probed yet", report.state),
        }
    };
    ComponentHealth::new("graph_store", status).with_detail(detail)
}
