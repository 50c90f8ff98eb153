use serde::{Deserialize, Serialize};

/// A fixed-length vector tied to a chunk or a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    pub owner_id: String,
    pub vector: Vec<f32>,
    /// Model/version tag of the producer.
    pub model: String,
}

impl Embedding {
    pub fn dimensions(&self) -> usize {
        self.vector.len()
    }
}

/// One nearest-neighbour result. Smaller distance is closer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorHit {
    pub id: String,
    /// `1 - cosine_similarity`, in `[0, 2]`.
    pub distance: f32,
}

impl VectorHit {
    pub fn similarity(&self) -> f32 {
        1.0 - self.distance
    }
}
