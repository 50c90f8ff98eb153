//! Structured log events for key engine operations.
//!
//! Each function emits a `tracing` event with an `event` field so log
//! pipelines can match on a stable name.

use lattice_core::AvailabilityState;

/// Graph availability moved between states.
pub fn availability_changed(from: AvailabilityState, to: AvailabilityState, reason: &str) {
    tracing::warn!(
        event = "availability_changed",
        from = %from,
        to = %to,
        reason = %reason,
        "graph availability changed"
    );
}

/// Operator override toggled.
pub fn vector_only_forced(forced: bool) {
    tracing::warn!(
        event = "vector_only_forced",
        forced = forced,
        "operator vector-only override changed"
    );
}

/// A cache backend started failing; logged once per outage.
pub fn cache_degraded(cache: &str, backend: &str, error: &str) {
    tracing::warn!(
        event = "cache_degraded",
        cache = %cache,
        backend = %backend,
        error = %error,
        "cache backend failing, serving as no-op"
    );
}

/// A cache backend answered again after an outage.
pub fn cache_recovered(cache: &str, backend: &str) {
    tracing::info!(
        event = "cache_recovered",
        cache = %cache,
        backend = %backend,
        "cache backend recovered"
    );
}

/// Graph expansion stopped before visiting every candidate.
pub fn graph_expansion_truncated(query_id: &str, expanded: usize, planned: usize, cause: &str) {
    tracing::warn!(
        event = "graph_expansion_truncated",
        query_id = %query_id,
        expanded = expanded,
        planned = planned,
        cause = %cause,
        "graph expansion truncated, keeping partial results"
    );
}

pub fn index_persisted(path: &str, vectors: usize, backend: &str) {
    tracing::info!(
        event = "index_persisted",
        path = %path,
        vectors = vectors,
        backend = %backend,
        "vector index persisted"
    );
}

pub fn index_persist_failed(path: &str, error: &str) {
    tracing::error!(
        event = "index_persist_failed",
        path = %path,
        error = %error,
        "vector index persist failed, continuing from memory"
    );
}

/// Log a degradation trigger event.
pub fn degradation_triggered(component: &str, failure: &str, fallback: &str) {
    tracing::warn!(
        event = "degradation_triggered",
        component = %component,
        failure = %failure,
        fallback = %fallback,
        "degradation triggered"
    );
}

pub fn cache_invalidated(cache: &str, prefix: &str, removed: u64) {
    tracing::info!(
        event = "cache_invalidated",
        cache = %cache,
        prefix = %prefix,
        removed = removed,
        "cache entries invalidated"
    );
}
