//! # lattice-cache
//!
//! Uniform get/set/invalidate/TTL caching over interchangeable backends.
//!
//! - [`backend::MemoryCacheBackend`]: bounded in-process store (moka, LRU,
//!   per-entry TTL).
//! - [`backend::RedisCacheBackend`]: networked store shared across instances.
//! - [`backend::NoopCacheBackend`]: caching disabled.
//!
//! [`CacheLayer`] sits on top of any backend, counts hits and misses, and
//! absorbs backend failures so a broken cache behaves as a no-op. The typed
//! caches in [`typed`] are what the retrieval engine talks to.

pub mod backend;
pub mod factory;
pub mod layer;
pub mod typed;

pub use factory::CacheSet;
pub use layer::CacheLayer;
pub use typed::{EmbeddingCache, EntityCache, SearchKey, SearchResultCache};
