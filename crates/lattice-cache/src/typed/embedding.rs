use std::sync::Arc;

use lattice_core::constants::CACHE_KEY_SEPARATOR;
use lattice_core::errors::CacheError;

use super::content_hash;
use crate::CacheLayer;

/// Query embeddings keyed by model tag and normalized query text.
///
/// Values are stored as little-endian f32 bytes.
#[derive(Clone)]
pub struct EmbeddingCache {
    layer: Arc<CacheLayer>,
}

impl EmbeddingCache {
    pub fn new(layer: Arc<CacheLayer>) -> Self {
        Self { layer }
    }

    pub fn layer(&self) -> &Arc<CacheLayer> {
        &self.layer
    }

    pub fn key(model: &str, normalized_text: &str) -> String {
        format!("{model}{CACHE_KEY_SEPARATOR}{}", content_hash(normalized_text))
    }

    pub async fn get(&self, model: &str, normalized_text: &str) -> Option<Vec<f32>> {
        let bytes = self.layer.get(&Self::key(model, normalized_text)).await?;
        match decode_f32s(&bytes) {
            Ok(embedding) => Some(embedding),
            Err(e) => {
                tracing::debug!(model, error = %e, "discarding malformed cached embedding");
                None
            }
        }
    }

    pub async fn put(&self, model: &str, normalized_text: &str, embedding: &[f32]) {
        self.layer
            .set(&Self::key(model, normalized_text), encode_f32s(embedding))
            .await;
    }

    /// Drop every embedding produced by `model`.
    pub async fn invalidate_model(&self, model: &str) -> u64 {
        self.layer
            .invalidate_prefix(&format!("{model}{CACHE_KEY_SEPARATOR}"))
            .await
    }
}

fn encode_f32s(values: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 4);
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

fn decode_f32s(bytes: &[u8]) -> Result<Vec<f32>, CacheError> {
    if bytes.is_empty() || bytes.len() % 4 != 0 {
        return Err(CacheError::Codec {
            reason: format!(
                "embedding payload of {} bytes is not a whole number of f32s",
                bytes.len()
            ),
        });
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}
