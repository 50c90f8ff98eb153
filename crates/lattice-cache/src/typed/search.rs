use std::sync::Arc;

use lattice_core::constants::CACHE_KEY_SEPARATOR;
use lattice_core::models::{AvailabilityState, SearchResult};

use super::{content_hash, decode_json, encode_json};
use crate::CacheLayer;

/// Search-result cache key: `{availability}:{k}:{hash(normalized query)}`.
///
/// Availability leads so that a vector-only answer computed while the graph
/// was down is never served once it is back, and so a whole availability
/// class can be dropped by prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchKey(String);

impl SearchKey {
    pub fn new(normalized_query: &str, k: usize, availability: AvailabilityState) -> Self {
        let sep = CACHE_KEY_SEPARATOR;
        Self(format!(
            "{}{sep}{k}{sep}{}",
            availability.as_str(),
            content_hash(normalized_query)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SearchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone)]
pub struct SearchResultCache {
    layer: Arc<CacheLayer>,
}

impl SearchResultCache {
    pub fn new(layer: Arc<CacheLayer>) -> Self {
        Self { layer }
    }

    pub fn layer(&self) -> &Arc<CacheLayer> {
        &self.layer
    }

    pub async fn get(&self, key: &SearchKey) -> Option<SearchResult> {
        let bytes = self.layer.get(key.as_str()).await?;
        match decode_json(&bytes) {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::debug!(key = %key, error = %e, "discarding undecodable search result");
                None
            }
        }
    }

    pub async fn put(&self, key: &SearchKey, result: &SearchResult) {
        match encode_json(result) {
            Ok(bytes) => self.layer.set(key.as_str(), bytes).await,
            Err(e) => tracing::debug!(key = %key, error = %e, "search result not cacheable"),
        }
    }

    /// Drop every cached result; used after bulk re-ingestion.
    pub async fn clear(&self) -> u64 {
        self.layer.invalidate_prefix("").await
    }
}
