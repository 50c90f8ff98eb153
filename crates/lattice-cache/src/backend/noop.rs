use std::time::Duration;

use async_trait::async_trait;
use lattice_core::errors::CacheError;
use lattice_core::traits::ICacheBackend;

/// Caching disabled: every get misses, every set is dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCacheBackend;

#[async_trait]
impl ICacheBackend for NoopCacheBackend {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    async fn invalidate(&self, _key: &str) -> Result<bool, CacheError> {
        Ok(false)
    }

    async fn invalidate_prefix(&self, _prefix: &str) -> Result<u64, CacheError> {
        Ok(0)
    }

    async fn size(&self) -> Result<u64, CacheError> {
        Ok(0)
    }
}
