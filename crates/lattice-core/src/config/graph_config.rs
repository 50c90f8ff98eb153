use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Graph store connection and retry tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// "memory" or "neo4j".
    pub backend: String,
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Initial backoff; doubles per retry up to `max_retry_delay_ms`.
    pub retry_delay_ms: u64,
    pub max_retry_delay_ms: u64,
    /// Per-attempt timeout.
    pub request_timeout_ms: u64,
    /// Concurrent in-flight calls allowed against the store.
    pub pool_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            backend: defaults::DEFAULT_GRAPH_BACKEND.to_string(),
            uri: defaults::DEFAULT_GRAPH_URI.to_string(),
            user: defaults::DEFAULT_GRAPH_USER.to_string(),
            password: String::new(),
            database: defaults::DEFAULT_GRAPH_DATABASE.to_string(),
            max_retries: defaults::DEFAULT_GRAPH_MAX_RETRIES,
            retry_delay_ms: defaults::DEFAULT_GRAPH_RETRY_DELAY_MS,
            max_retry_delay_ms: defaults::DEFAULT_GRAPH_MAX_RETRY_DELAY_MS,
            request_timeout_ms: defaults::DEFAULT_GRAPH_REQUEST_TIMEOUT_MS,
            pool_size: defaults::DEFAULT_GRAPH_POOL_SIZE,
        }
    }
}

impl GraphConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn max_retry_delay(&self) -> Duration {
        Duration::from_millis(self.max_retry_delay_ms)
    }
}
