use std::time::Duration;

use async_trait::async_trait;

use crate::errors::CacheError;

/// Raw key/value storage behind a cache.
///
/// Implementations report their own failures; absorbing them into
/// "miss" / no-op behaviour is the cache layer's job.
#[async_trait]
pub trait ICacheBackend: Send + Sync {
    /// Short backend name for stats and logs.
    fn name(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    /// Remove one key. Returns whether it was present.
    async fn invalidate(&self, key: &str) -> Result<bool, CacheError>;

    /// Remove every key starting with `prefix`. Returns the number removed.
    async fn invalidate_prefix(&self, prefix: &str) -> Result<u64, CacheError>;

    /// Approximate number of live entries.
    async fn size(&self) -> Result<u64, CacheError>;
}
