//! Bounded in-process store on moka.
//!
//! Plain LRU eviction at the configured entry cap, TTL set per entry
//! through moka's `Expiry` hook.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use lattice_core::errors::CacheError;
use lattice_core::traits::ICacheBackend;
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use moka::Expiry;

#[derive(Debug, Clone)]
struct MemoryEntry {
    bytes: Vec<u8>,
    ttl: Duration,
    expires_at: Instant,
}

struct PerEntryTtl;

impl Expiry<String, MemoryEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &MemoryEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &MemoryEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

pub struct MemoryCacheBackend {
    cache: Cache<String, MemoryEntry>,
}

impl MemoryCacheBackend {
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .eviction_policy(EvictionPolicy::lru())
            .expire_after(PerEntryTtl)
            .build();
        Self { cache }
    }

    fn live(&self, key: &str) -> Option<Vec<u8>> {
        let entry = self.cache.get(key)?;
        // moka expires lazily; do not hand out an entry past its deadline.
        if Instant::now() >= entry.expires_at {
            self.cache.invalidate(key);
            return None;
        }
        Some(entry.bytes)
    }
}

#[async_trait]
impl ICacheBackend for MemoryCacheBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.live(key))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let entry = MemoryEntry {
            bytes: value,
            ttl,
            expires_at: Instant::now() + ttl,
        };
        self.cache.insert(key.to_string(), entry);
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.cache.remove(key).is_some())
    }

    async fn invalidate_prefix(&self, prefix: &str) -> Result<u64, CacheError> {
        if prefix.is_empty() {
            self.cache.run_pending_tasks();
            let n = self.cache.entry_count();
            self.cache.invalidate_all();
            return Ok(n);
        }
        let keys: Vec<String> = self
            .cache
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.to_string())
            .collect();
        let mut removed = 0;
        for key in keys {
            if self.cache.remove(&key).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn size(&self) -> Result<u64, CacheError> {
        self.cache.run_pending_tasks();
        Ok(self.cache.entry_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn set_then_get() {
        let backend = MemoryCacheBackend::new(100);
        backend.set("a", vec![1, 2, 3], HOUR).await.unwrap();
        assert_eq!(backend.get("a").await.unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(backend.get("b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn entry_expires_after_its_own_ttl() {
        let backend = MemoryCacheBackend::new(100);
        backend.set("short", vec![1], Duration::from_millis(30)).await.unwrap();
        backend.set("long", vec![2], HOUR).await.unwrap();
        std::thread::sleep(Duration::from_millis(80));
        assert_eq!(backend.get("short").await.unwrap(), None);
        assert_eq!(backend.get("long").await.unwrap(), Some(vec![2]));
    }

    #[tokio::test]
    async fn overwrite_resets_value_and_ttl() {
        let backend = MemoryCacheBackend::new(100);
        backend.set("k", vec![1], Duration::from_millis(30)).await.unwrap();
        backend.set("k", vec![9], HOUR).await.unwrap();
        std::thread::sleep(Duration::from_millis(80));
        assert_eq!(backend.get("k").await.unwrap(), Some(vec![9]));
    }

    #[tokio::test]
    async fn capacity_is_enforced() {
        let backend = MemoryCacheBackend::new(2);
        for i in 0..10u8 {
            backend.set(&format!("k{i}"), vec![i], HOUR).await.unwrap();
        }
        assert!(backend.size().await.unwrap() <= 2);
    }

    #[tokio::test]
    async fn prefix_invalidation_only_touches_prefix() {
        let backend = MemoryCacheBackend::new(100);
        backend.set("healthy:3:a", vec![1], HOUR).await.unwrap();
        backend.set("healthy:5:b", vec![2], HOUR).await.unwrap();
        backend.set("degraded:3:a", vec![3], HOUR).await.unwrap();

        assert_eq!(backend.invalidate_prefix("healthy:").await.unwrap(), 2);
        assert_eq!(backend.get("healthy:3:a").await.unwrap(), None);
        assert_eq!(backend.get("degraded:3:a").await.unwrap(), Some(vec![3]));
    }

    #[tokio::test]
    async fn empty_prefix_clears_everything() {
        let backend = MemoryCacheBackend::new(100);
        backend.set("a", vec![1], HOUR).await.unwrap();
        backend.set("b", vec![2], HOUR).await.unwrap();
        backend.invalidate_prefix("").await.unwrap();
        assert_eq!(backend.get("a").await.unwrap(), None);
        assert_eq!(backend.get("b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn invalidate_reports_presence() {
        let backend = MemoryCacheBackend::new(100);
        backend.set("a", vec![1], HOUR).await.unwrap();
        assert!(backend.invalidate("a").await.unwrap());
        assert!(!backend.invalidate("a").await.unwrap());
    }
}
