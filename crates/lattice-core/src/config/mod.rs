//! Engine configuration.
//!
//! Resolution order (highest priority first):
//! 1. Environment variables (`LATTICE_*`)
//! 2. TOML file passed to [`LatticeConfig::load`]
//! 3. Compiled defaults in [`defaults`]

mod cache_config;
pub mod defaults;
mod graph_config;
mod health_config;
mod observability_config;
mod retrieval_config;
mod vector_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use cache_config::CacheConfig;
pub use graph_config::GraphConfig;
pub use health_config::HealthConfig;
pub use observability_config::ObservabilityConfig;
pub use retrieval_config::RetrievalConfig;
pub use vector_config::VectorConfig;

use crate::constants::ENV_PREFIX;
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeConfig {
    pub cache: CacheConfig,
    pub vector: VectorConfig,
    pub graph: GraphConfig,
    pub health: HealthConfig,
    pub retrieval: RetrievalConfig,
    pub observability: ObservabilityConfig,
}

impl LatticeConfig {
    /// Load defaults, overlay `path` if given, then `LATTICE_*` env vars,
    /// and validate the result.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_with(|key| std::env::var(key).ok());
    }

    /// Apply `LATTICE_*` overrides read through `lookup`, which receives the
    /// full prefixed variable name. Unparseable values are ignored, leaving
    /// the previous layer in place.
    pub fn apply_env_overrides_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: std::str::FromStr>(
            lookup: &dyn Fn(&str) -> Option<String>,
            key: &str,
        ) -> Option<T> {
            lookup(key).and_then(|v| v.trim().parse().ok())
        }
        let prefixed = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));
        let lookup: &dyn Fn(&str) -> Option<String> = &prefixed;

        // Cache
        if let Some(v) = lookup("CACHE_BACKEND") {
            self.cache.backend = v.trim().to_ascii_lowercase();
        }
        if let Some(v) = lookup("REDIS_URL") {
            self.cache.redis_url = v;
        }
        if let Some(v) = parsed(lookup, "CACHE_TTL_SECS") {
            self.cache.default_ttl_secs = v;
        }
        if let Some(v) = parsed(lookup, "EMBEDDING_CACHE_TTL_SECS") {
            self.cache.embedding_ttl_secs = Some(v);
        }
        if let Some(v) = parsed(lookup, "ENTITY_CACHE_TTL_SECS") {
            self.cache.entity_ttl_secs = Some(v);
        }
        if let Some(v) = parsed(lookup, "SEARCH_CACHE_TTL_SECS") {
            self.cache.search_ttl_secs = Some(v);
        }
        if let Some(v) = parsed(lookup, "EMBEDDING_CACHE_SIZE") {
            self.cache.embedding_max_entries = v;
        }
        if let Some(v) = parsed(lookup, "ENTITY_CACHE_SIZE") {
            self.cache.entity_max_entries = v;
        }
        if let Some(v) = parsed(lookup, "SEARCH_CACHE_SIZE") {
            self.cache.search_max_entries = v;
        }

        // Graph
        if let Some(v) = lookup("GRAPH_BACKEND") {
            self.graph.backend = v.trim().to_ascii_lowercase();
        }
        if let Some(v) = lookup("GRAPH_URI") {
            self.graph.uri = v;
        }
        if let Some(v) = lookup("GRAPH_USER") {
            self.graph.user = v;
        }
        if let Some(v) = lookup("GRAPH_PASSWORD") {
            self.graph.password = v;
        }
        if let Some(v) = parsed(lookup, "GRAPH_MAX_RETRIES") {
            self.graph.max_retries = v;
        }
        if let Some(v) = parsed(lookup, "GRAPH_RETRY_DELAY_MS") {
            self.graph.retry_delay_ms = v;
        }

        // Either spelling forces vector-only mode.
        for key in ["FORCE_VECTOR_ONLY", "DISABLE_GRAPH"] {
            if let Some(v) = lookup(key) {
                if let Some(flag) = parse_flag(&v) {
                    self.health.force_vector_only = flag;
                }
            }
        }

        // Vector
        if let Some(v) = lookup("VECTOR_BACKEND") {
            self.vector.backend = v.trim().to_ascii_lowercase();
        }
        if let Some(v) = lookup("VECTOR_PATH") {
            self.vector.path = if v.trim().is_empty() { None } else { Some(v) };
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn fail(field: &str, message: &str) -> Result<(), ConfigError> {
            Err(ConfigError::ValidationFailed {
                field: field.to_string(),
                message: message.to_string(),
            })
        }

        if !matches!(self.cache.backend.as_str(), "memory" | "redis" | "none") {
            return fail("cache.backend", "must be one of memory, redis, none");
        }
        if self.cache.default_ttl_secs == 0 {
            return fail("cache.default_ttl_secs", "must be greater than 0");
        }
        for kind in crate::models::CacheKind::ALL {
            if self.cache.ttl_for(kind).is_zero() {
                return fail("cache.*_ttl_secs", "per-cache TTL must be greater than 0");
            }
            if self.cache.max_entries_for(kind) == 0 {
                return fail("cache.*_max_entries", "size caps must be greater than 0");
            }
        }
        if self.cache.ttl_for(crate::models::CacheKind::SearchResult)
            >= self.cache.ttl_for(crate::models::CacheKind::Embedding)
        {
            return fail(
                "cache.search_ttl_secs",
                "must be shorter than the embedding cache TTL",
            );
        }
        if self.cache.operation_timeout_ms == 0 {
            return fail("cache.operation_timeout_ms", "must be greater than 0");
        }

        if !matches!(self.vector.backend.as_str(), "flat" | "sqlite") {
            return fail("vector.backend", "must be one of flat, sqlite");
        }

        if !matches!(self.graph.backend.as_str(), "memory" | "neo4j") {
            return fail("graph.backend", "must be one of memory, neo4j");
        }
        if self.graph.request_timeout_ms == 0 {
            return fail("graph.request_timeout_ms", "must be greater than 0");
        }
        if self.graph.pool_size == 0 {
            return fail("graph.pool_size", "must be greater than 0");
        }
        if self.graph.max_retry_delay_ms < self.graph.retry_delay_ms {
            return fail(
                "graph.max_retry_delay_ms",
                "must be at least graph.retry_delay_ms",
            );
        }

        if self.health.probe_interval_ms == 0 || self.health.probe_timeout_ms == 0 {
            return fail("health.probe_*_ms", "must be greater than 0");
        }
        if self.health.success_threshold == 0 || self.health.failure_threshold == 0 {
            return fail("health.*_threshold", "must be at least 1");
        }

        let r = &self.retrieval;
        if r.max_k == 0 {
            return fail("retrieval.max_k", "must be greater than 0");
        }
        if r.overfetch_factor == 0 {
            return fail("retrieval.overfetch_factor", "must be at least 1");
        }
        if !(r.graph_discount > 0.0 && r.graph_discount < 1.0) {
            return fail("retrieval.graph_discount", "must be strictly between 0 and 1");
        }
        if r.expansion_concurrency == 0 || r.expansion_timeout_ms == 0 {
            return fail("retrieval.expansion_*", "must be greater than 0");
        }
        if r.embedding_dimensions == 0 {
            return fail("retrieval.embedding_dimensions", "must be greater than 0");
        }

        if self.observability.query_log_capacity == 0 || self.observability.latency_window == 0 {
            return fail("observability", "buffer sizes must be greater than 0");
        }
        Ok(())
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
