//! Cache behaviour as seen through the typed caches.

use std::time::Duration;

use lattice_cache::CacheSet;
use lattice_core::config::CacheConfig;
use lattice_core::models::{AvailabilityState, CacheKind, SearchResult};
use lattice_cache::SearchKey;

#[tokio::test]
async fn search_entries_expire_after_ttl() {
    let config = CacheConfig {
        search_ttl_secs: Some(1),
        ..CacheConfig::default()
    };
    let set = CacheSet::from_config(&config);
    let key = SearchKey::new("test", 5, AvailabilityState::Healthy);
    let result = SearchResult::empty(AvailabilityState::Healthy);

    set.search.put(&key, &result).await;
    assert_eq!(set.search.get(&key).await, Some(result));

    tokio::time::sleep(Duration::from_millis(1_100)).await;
    assert_eq!(set.search.get(&key).await, None);
}

#[tokio::test]
async fn unreachable_redis_never_fails_callers() {
    let config = CacheConfig {
        backend: "redis".into(),
        redis_url: "redis://127.0.0.1:1".into(),
        operation_timeout_ms: 200,
        ..CacheConfig::default()
    };
    let set = CacheSet::from_config(&config);
    let key = SearchKey::new("architecture decisions", 3, AvailabilityState::Healthy);

    set.search
        .put(&key, &SearchResult::empty(AvailabilityState::Healthy))
        .await;
    assert_eq!(set.search.get(&key).await, None);
    assert_eq!(set.embedding.get("m", "q").await, None);

    let stats = set.layer(CacheKind::SearchResult).stats().await;
    assert!(stats.degraded);
    assert_eq!(stats.backend, "redis");
    assert_eq!(stats.hits, 0);
}

#[tokio::test]
async fn disabled_cache_always_misses() {
    let config = CacheConfig {
        backend: "none".into(),
        ..CacheConfig::default()
    };
    let set = CacheSet::from_config(&config);
    set.embedding.put("m", "q", &[1.0, 2.0]).await;
    assert_eq!(set.embedding.get("m", "q").await, None);
    assert!(!set.layer(CacheKind::Embedding).is_degraded());
}
