//! Builds the three engine caches from configuration.

use std::sync::Arc;

use lattice_core::config::CacheConfig;
use lattice_core::models::{CacheKind, CacheStats};
use lattice_core::traits::ICacheBackend;

use crate::backend::{MemoryCacheBackend, NoopCacheBackend, RedisCacheBackend};
use crate::typed::{EmbeddingCache, EntityCache, SearchResultCache};
use crate::CacheLayer;

/// The embedding, entity-extraction and search-result caches, each with its
/// own backend instance, TTL and size cap.
#[derive(Clone)]
pub struct CacheSet {
    pub embedding: EmbeddingCache,
    pub entity: EntityCache,
    pub search: SearchResultCache,
}

impl CacheSet {
    pub fn from_config(config: &CacheConfig) -> Self {
        let layer = |kind| Arc::new(CacheLayer::new(kind, build_backend(config, kind), config.ttl_for(kind)));
        Self {
            embedding: EmbeddingCache::new(layer(CacheKind::Embedding)),
            entity: EntityCache::new(layer(CacheKind::Entity)),
            search: SearchResultCache::new(layer(CacheKind::SearchResult)),
        }
    }

    /// Wrap caller-supplied backends, mainly for tests.
    pub fn with_backends(
        config: &CacheConfig,
        embedding: Arc<dyn ICacheBackend>,
        entity: Arc<dyn ICacheBackend>,
        search: Arc<dyn ICacheBackend>,
    ) -> Self {
        let layer = |kind, backend| Arc::new(CacheLayer::new(kind, backend, config.ttl_for(kind)));
        Self {
            embedding: EmbeddingCache::new(layer(CacheKind::Embedding, embedding)),
            entity: EntityCache::new(layer(CacheKind::Entity, entity)),
            search: SearchResultCache::new(layer(CacheKind::SearchResult, search)),
        }
    }

    pub fn layer(&self, kind: CacheKind) -> &Arc<CacheLayer> {
        match kind {
            CacheKind::Embedding => self.embedding.layer(),
            CacheKind::Entity => self.entity.layer(),
            CacheKind::SearchResult => self.search.layer(),
        }
    }

    pub async fn stats(&self) -> Vec<CacheStats> {
        let mut out = Vec::with_capacity(CacheKind::ALL.len());
        for kind in CacheKind::ALL {
            out.push(self.layer(kind).stats().await);
        }
        out
    }
}

fn build_backend(config: &CacheConfig, kind: CacheKind) -> Arc<dyn ICacheBackend> {
    match config.backend.as_str() {
        "redis" => {
            let prefix = format!("{}:{}:", config.key_prefix, kind.namespace());
            match RedisCacheBackend::new(
                &config.redis_url,
                prefix,
                config.operation_timeout(),
                config.reconnect_cooldown(),
            ) {
                Ok(backend) => Arc::new(backend),
                Err(e) => {
                    tracing::warn!(cache = %kind, error = %e, "redis cache unusable, caching disabled");
                    Arc::new(NoopCacheBackend)
                }
            }
        }
        "none" => Arc::new(NoopCacheBackend),
        _ => Arc::new(MemoryCacheBackend::new(config.max_entries_for(kind))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_config_builds_three_independent_caches() {
        let set = CacheSet::from_config(&CacheConfig::default());
        set.search.layer().set("k", vec![1]).await;
        assert_eq!(set.embedding.layer().get("k").await, None);
        assert_eq!(set.search.layer().get("k").await, Some(vec![1]));

        let stats = set.stats().await;
        assert_eq!(stats.len(), 3);
        assert!(stats.iter().all(|s| s.backend == "memory"));
    }

    #[tokio::test]
    async fn ttls_follow_config() {
        let config = CacheConfig::default();
        let set = CacheSet::from_config(&config);
        for kind in CacheKind::ALL {
            assert_eq!(set.layer(kind).ttl(), config.ttl_for(kind));
        }
        assert!(set.search.layer().ttl() < set.embedding.layer().ttl());
    }

    #[tokio::test]
    async fn bad_redis_url_falls_back_to_noop() {
        let config = CacheConfig {
            backend: "redis".into(),
            redis_url: "::::".into(),
            ..CacheConfig::default()
        };
        let set = CacheSet::from_config(&config);
        assert_eq!(set.search.layer().backend_name(), "none");
    }
}
