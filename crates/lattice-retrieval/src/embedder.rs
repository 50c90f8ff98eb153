//! Deterministic feature-hashing embedder.
//!
//! Each token is hashed into one of `dimensions` buckets with FNV-1a; a second
//! hash bit picks the sign so colliding tokens tend to cancel rather than
//! pile up. Weights are sublinear term frequency. The vector is L2
//! normalized, so cosine similarity reduces to a dot product.

use std::collections::HashMap;

use lattice_core::errors::{LatticeError, LatticeResult};
use lattice_core::traits::IEmbeddingProvider;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Always-available local embedding provider. Useful as a default and for
/// tests; plug a model-backed [`IEmbeddingProvider`] in for real semantics.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn fnv1a(term: &str) -> u64 {
        term.bytes().fold(FNV_OFFSET, |h, b| {
            (h ^ u64::from(b)).wrapping_mul(FNV_PRIME)
        })
    }

    /// Lowercase alphanumeric terms of at least two characters.
    fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|s| s.chars().count() >= 2)
            .map(str::to_lowercase)
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut tf: HashMap<String, u32> = HashMap::new();
        for tok in Self::tokenize(text) {
            *tf.entry(tok).or_default() += 1;
        }

        let mut v = vec![0.0f32; self.dimensions];
        for (term, count) in &tf {
            let h = Self::fnv1a(term);
            let bucket = (h % self.dimensions as u64) as usize;
            let sign = if (h >> 63) == 0 { 1.0 } else { -1.0 };
            v[bucket] += sign * (1.0 + (*count as f32).ln());
        }

        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }
}

impl IEmbeddingProvider for HashingEmbedder {
    fn embed(&self, text: &str) -> LatticeResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(LatticeError::ValidationError(
                "cannot embed empty text".to_string(),
            ));
        }
        Ok(self.vectorize(text))
    }

    fn embed_batch(&self, texts: &[String]) -> LatticeResult<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hashing-v1"
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn unit_norm_and_dimensions() {
        let e = HashingEmbedder::new(256);
        let v = e.embed("architecture decisions for the storage layer").unwrap();
        assert_eq!(v.len(), 256);
        let norm = dot(&v, &v).sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "norm {norm}");
    }

    #[test]
    fn deterministic_and_case_insensitive() {
        let e = HashingEmbedder::new(128);
        assert_eq!(e.embed("Graph Store").unwrap(), e.embed("graph store").unwrap());
    }

    #[test]
    fn shared_terms_score_higher() {
        let e = HashingEmbedder::new(256);
        let a = e.embed("cache invalidation strategy").unwrap();
        let b = e.embed("cache eviction strategy").unwrap();
        let c = e.embed("neo4j bolt handshake").unwrap();
        assert!(dot(&a, &b) > dot(&a, &c));
    }

    #[test]
    fn only_short_tokens_give_zero_vector() {
        let e = HashingEmbedder::new(32);
        let v = e.embed("a b c").unwrap();
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn empty_text_is_rejected() {
        let e = HashingEmbedder::new(32);
        assert!(e.embed("   ").unwrap_err().is_validation());
    }

    #[test]
    fn batch_matches_single() {
        let e = HashingEmbedder::new(64);
        let texts = vec!["vector index".to_string(), "graph store".to_string()];
        let batch = e.embed_batch(&texts).unwrap();
        assert_eq!(batch[1], e.embed("graph store").unwrap());
    }
}
