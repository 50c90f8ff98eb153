use serde::{Deserialize, Serialize};

use super::defaults;

/// Vector index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorConfig {
    /// "flat" (binary snapshot) or "sqlite".
    pub backend: String,
    /// On-disk location. `None` keeps the index purely in memory.
    pub path: Option<String>,
    /// Index size above which queries score in parallel.
    pub parallel_threshold: usize,
    /// Write the index back to `path` on shutdown.
    pub persist_on_shutdown: bool,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            backend: defaults::DEFAULT_VECTOR_BACKEND.to_string(),
            path: None,
            parallel_threshold: defaults::DEFAULT_PARALLEL_SCAN_THRESHOLD,
            persist_on_shutdown: defaults::DEFAULT_PERSIST_ON_SHUTDOWN,
        }
    }
}
