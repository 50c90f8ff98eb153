use std::sync::Arc;

use lattice_core::constants::CACHE_KEY_SEPARATOR;
use lattice_core::errors::LatticeResult;
use lattice_core::models::Entity;
use lattice_core::traits::IEntityExtractor;

use super::{content_hash, decode_json, encode_json};
use crate::CacheLayer;

/// Extraction output keyed by extractor tag and content hash, so identical
/// text is never sent through extraction twice within the TTL.
#[derive(Clone)]
pub struct EntityCache {
    layer: Arc<CacheLayer>,
}

impl EntityCache {
    pub fn new(layer: Arc<CacheLayer>) -> Self {
        Self { layer }
    }

    pub fn layer(&self) -> &Arc<CacheLayer> {
        &self.layer
    }

    pub fn key(extractor: &str, text: &str) -> String {
        format!("{extractor}{CACHE_KEY_SEPARATOR}{}", content_hash(text))
    }

    pub async fn get(&self, extractor: &str, text: &str) -> Option<Vec<Entity>> {
        let bytes = self.layer.get(&Self::key(extractor, text)).await?;
        match decode_json(&bytes) {
            Ok(entities) => Some(entities),
            Err(e) => {
                tracing::debug!(extractor, error = %e, "discarding undecodable entity list");
                None
            }
        }
    }

    pub async fn put(&self, extractor: &str, text: &str, entities: &[Entity]) {
        match encode_json(entities) {
            Ok(bytes) => self.layer.set(&Self::key(extractor, text), bytes).await,
            Err(e) => tracing::debug!(error = %e, "entity list not cacheable"),
        }
    }

    /// Cached extraction, running `extractor` only on a miss. Extraction
    /// errors propagate; nothing is cached for them.
    pub async fn get_or_extract(
        &self,
        text: &str,
        extractor: &dyn IEntityExtractor,
    ) -> LatticeResult<Vec<Entity>> {
        if let Some(hit) = self.get(extractor.name(), text).await {
            return Ok(hit);
        }
        let entities = extractor.extract(text)?;
        self.put(extractor.name(), text, &entities).await;
        Ok(entities)
    }

    /// Forget the extraction for one piece of content, e.g. after re-ingestion.
    pub async fn invalidate(&self, extractor: &str, text: &str) -> bool {
        self.layer.invalidate(&Self::key(extractor, text)).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use lattice_core::models::CacheKind;

    use super::*;
    use crate::backend::MemoryCacheBackend;

    struct CountingExtractor {
        calls: AtomicUsize,
    }

    impl IEntityExtractor for CountingExtractor {
        fn extract(&self, text: &str) -> LatticeResult<Vec<Entity>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(text
                .split_whitespace()
                .filter(|w| w.chars().next().is_some_and(char::is_uppercase))
                .map(|w| Entity {
                    id: format!("ent:{}", w.to_lowercase()),
                    name: w.to_string(),
                    entity_type: "proper_noun".to_string(),
                })
                .collect())
        }

        fn name(&self) -> &str {
            "caps-v1"
        }
    }

    #[tokio::test]
    async fn extraction_runs_once_per_content() {
        let cache = EntityCache::new(Arc::new(CacheLayer::new(
            CacheKind::Entity,
            Arc::new(MemoryCacheBackend::new(100)),
            Duration::from_secs(60),
        )));
        let extractor = CountingExtractor {
            calls: AtomicUsize::new(0),
        };
        let text = "Postgres replaced Redis for Sessions";

        let first = cache.get_or_extract(text, &extractor).await.unwrap();
        let second = cache.get_or_extract(text, &extractor).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);

        assert!(cache.invalidate("caps-v1", text).await);
        cache.get_or_extract(text, &extractor).await.unwrap();
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 2);
    }
}
