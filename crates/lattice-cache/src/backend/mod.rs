//! Concrete [`ICacheBackend`](lattice_core::traits::ICacheBackend) implementations.

mod memory;
mod noop;
mod redis;

pub use self::memory::MemoryCacheBackend;
pub use self::noop::NoopCacheBackend;
pub use self::redis::RedisCacheBackend;
