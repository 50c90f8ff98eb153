//! The cache abstraction callers see.
//!
//! Backend failures never escape: a failing `get` is a miss, a failing `set`
//! is dropped, and the outage is logged once when it starts and once when
//! it ends.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lattice_core::errors::CacheError;
use lattice_core::models::{CacheKind, CacheStats};
use lattice_core::traits::ICacheBackend;
use lattice_observability::tracing_setup::events;

pub struct CacheLayer {
    kind: CacheKind,
    backend: Arc<dyn ICacheBackend>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    /// Set while the backend is failing.
    degraded: AtomicBool,
}

impl CacheLayer {
    pub fn new(kind: CacheKind, backend: Arc<dyn ICacheBackend>, ttl: Duration) -> Self {
        Self {
            kind,
            backend,
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            degraded: AtomicBool::new(false),
        }
    }

    pub fn kind(&self) -> CacheKind {
        self.kind
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        match self.backend.get(key).await {
            Ok(Some(value)) => {
                self.mark_ok();
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            Ok(None) => {
                self.mark_ok();
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            Err(e) => {
                self.mark_failed(&e);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store with this cache's TTL.
    pub async fn set(&self, key: &str, value: Vec<u8>) {
        self.set_with_ttl(key, value, self.ttl).await;
    }

    pub async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) {
        match self.backend.set(key, value, ttl).await {
            Ok(()) => self.mark_ok(),
            Err(e) => self.mark_failed(&e),
        }
    }

    pub async fn invalidate(&self, key: &str) -> bool {
        match self.backend.invalidate(key).await {
            Ok(removed) => {
                self.mark_ok();
                removed
            }
            Err(e) => {
                self.mark_failed(&e);
                false
            }
        }
    }

    /// Drop every entry whose key starts with `prefix`; `""` drops all.
    pub async fn invalidate_prefix(&self, prefix: &str) -> u64 {
        match self.backend.invalidate_prefix(prefix).await {
            Ok(removed) => {
                self.mark_ok();
                events::cache_invalidated(self.kind.namespace(), prefix, removed);
                removed
            }
            Err(e) => {
                self.mark_failed(&e);
                0
            }
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Acquire)
    }

    pub async fn stats(&self) -> CacheStats {
        let size = match self.backend.size().await {
            Ok(n) => n,
            Err(e) => {
                self.mark_failed(&e);
                0
            }
        };
        let hits = self.hits();
        let misses = self.misses();
        CacheStats {
            kind: self.kind,
            backend: self.backend.name().to_string(),
            hits,
            misses,
            size,
            hit_rate: CacheStats::compute_hit_rate(hits, misses),
            degraded: self.is_degraded(),
        }
    }

    fn mark_failed(&self, error: &CacheError) {
        if !self.degraded.swap(true, Ordering::AcqRel) {
            events::cache_degraded(
                self.kind.namespace(),
                self.backend.name(),
                &error.to_string(),
            );
        } else {
            tracing::trace!(cache = %self.kind, error = %error, "cache call failed");
        }
    }

    fn mark_ok(&self) {
        if self.degraded.swap(false, Ordering::AcqRel) {
            events::cache_recovered(self.kind.namespace(), self.backend.name());
        }
    }
}
