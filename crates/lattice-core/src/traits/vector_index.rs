use std::path::Path;

use crate::errors::{PersistenceError, VectorError};
use crate::models::VectorHit;

/// Nearest-neighbour index over fixed-dimension embeddings.
///
/// `add` calls are serialized against each other; `query` may run
/// concurrently with anything and observes either the state before or
/// after a given `add`.
pub trait IVectorIndex: Send + Sync {
    /// Insert or replace. Fails with `DimensionMismatch` and leaves the index
    /// untouched when `embedding` has the wrong length.
    fn add(&self, id: &str, embedding: &[f32]) -> Result<(), VectorError>;

    /// At most `k` hits by ascending distance; ties by insertion order.
    fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<VectorHit>, VectorError>;

    fn remove(&self, id: &str) -> bool;

    fn contains(&self, id: &str) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Established dimensionality, `None` until the first add or load.
    fn dimensions(&self) -> Option<usize>;

    /// Atomically write the index to `path`.
    fn persist(&self, path: &Path) -> Result<(), PersistenceError>;

    /// Replace the in-memory contents with what is stored at `path`.
    fn load(&self, path: &Path) -> Result<(), PersistenceError>;

    fn backend_name(&self) -> &'static str;
}
