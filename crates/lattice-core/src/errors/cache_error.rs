/// Cache backend errors. Never surfaced past the cache layer.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache backend {backend} unreachable: {reason}")]
    Unreachable { backend: String, reason: String },

    #[error("cache backend {backend} timed out after {timeout_ms}ms")]
    Timeout { backend: String, timeout_ms: u64 },

    #[error("cache codec failed: {reason}")]
    Codec { reason: String },

    #[error("cache backend failure: {reason}")]
    Backend { reason: String },
}
