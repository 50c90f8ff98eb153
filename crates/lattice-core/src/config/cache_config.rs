use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::CacheKind;

/// Cache subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// "memory", "redis" or "none".
    pub backend: String,
    /// Connection target when `backend = "redis"`.
    pub redis_url: String,
    /// Fallback TTL for any cache without its own override.
    pub default_ttl_secs: u64,
    pub embedding_ttl_secs: Option<u64>,
    pub entity_ttl_secs: Option<u64>,
    pub search_ttl_secs: Option<u64>,
    pub embedding_max_entries: u64,
    pub entity_max_entries: u64,
    pub search_max_entries: u64,
    /// Upper bound on any single networked cache call.
    pub operation_timeout_ms: u64,
    /// Minimum gap between reconnect attempts after a networked failure.
    pub reconnect_cooldown_ms: u64,
    /// Prepended to every key on a shared backend.
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: defaults::DEFAULT_CACHE_BACKEND.to_string(),
            redis_url: defaults::DEFAULT_REDIS_URL.to_string(),
            default_ttl_secs: defaults::DEFAULT_CACHE_TTL_SECS,
            embedding_ttl_secs: Some(defaults::DEFAULT_EMBEDDING_TTL_SECS),
            entity_ttl_secs: None,
            search_ttl_secs: Some(defaults::DEFAULT_SEARCH_TTL_SECS),
            embedding_max_entries: defaults::DEFAULT_EMBEDDING_CACHE_SIZE,
            entity_max_entries: defaults::DEFAULT_ENTITY_CACHE_SIZE,
            search_max_entries: defaults::DEFAULT_SEARCH_CACHE_SIZE,
            operation_timeout_ms: defaults::DEFAULT_CACHE_OP_TIMEOUT_MS,
            reconnect_cooldown_ms: defaults::DEFAULT_CACHE_RECONNECT_COOLDOWN_MS,
            key_prefix: defaults::DEFAULT_CACHE_KEY_PREFIX.to_string(),
        }
    }
}

impl CacheConfig {
    pub fn ttl_for(&self, kind: CacheKind) -> Duration {
        let secs = match kind {
            CacheKind::Embedding => self.embedding_ttl_secs,
            CacheKind::Entity => self.entity_ttl_secs,
            CacheKind::SearchResult => self.search_ttl_secs,
        };
        Duration::from_secs(secs.unwrap_or(self.default_ttl_secs))
    }

    pub fn max_entries_for(&self, kind: CacheKind) -> u64 {
        match kind {
            CacheKind::Embedding => self.embedding_max_entries,
            CacheKind::Entity => self.entity_max_entries,
            CacheKind::SearchResult => self.search_max_entries,
        }
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    pub fn reconnect_cooldown(&self) -> Duration {
        Duration::from_millis(self.reconnect_cooldown_ms)
    }
}
