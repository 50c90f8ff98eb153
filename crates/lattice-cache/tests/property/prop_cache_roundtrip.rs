use std::sync::Arc;
use std::time::Duration;

use lattice_cache::backend::MemoryCacheBackend;
use lattice_cache::{CacheLayer, EmbeddingCache};
use lattice_core::models::CacheKind;
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn set_then_get_returns_identical_bytes(
        entries in proptest::collection::hash_map("[a-z0-9:]{1,24}", proptest::collection::vec(any::<u8>(), 0..256), 1..32)
    ) {
        let rt = runtime();
        rt.block_on(async {
            let layer = CacheLayer::new(
                CacheKind::Entity,
                Arc::new(MemoryCacheBackend::new(1_000)),
                Duration::from_secs(3600),
            );
            for (k, v) in &entries {
                layer.set(k, v.clone()).await;
            }
            for (k, v) in &entries {
                let got = layer.get(k).await;
                prop_assert_eq!(got.as_ref(), Some(v));
            }
            prop_assert_eq!(layer.hits(), entries.len() as u64);
            prop_assert_eq!(layer.misses(), 0);
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn embeddings_survive_byte_encoding(
        v in proptest::collection::vec(-1.0e6f32..1.0e6f32, 1..512),
        text in "[a-z ]{1,40}",
    ) {
        let rt = runtime();
        rt.block_on(async {
            let cache = EmbeddingCache::new(Arc::new(CacheLayer::new(
                CacheKind::Embedding,
                Arc::new(MemoryCacheBackend::new(16)),
                Duration::from_secs(3600),
            )));
            cache.put("model", &text, &v).await;
            prop_assert_eq!(cache.get("model", &text).await, Some(v.clone()));
            Ok::<(), TestCaseError>(())
        })?;
    }
}
