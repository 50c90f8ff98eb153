//! Backend selection and startup loading.

use std::path::Path;
use std::sync::Arc;

use lattice_core::config::VectorConfig;
use lattice_core::errors::{LatticeResult, VectorError};
use lattice_core::traits::IVectorIndex;

use crate::{FlatVectorIndex, SqliteVectorIndex};

/// An empty index of the configured backend.
pub fn create_index(config: &VectorConfig) -> Result<Arc<dyn IVectorIndex>, VectorError> {
    match config.backend.as_str() {
        "flat" => Ok(Arc::new(FlatVectorIndex::new(config.parallel_threshold))),
        "sqlite" => Ok(Arc::new(SqliteVectorIndex::new(config.parallel_threshold))),
        other => Err(VectorError::UnknownBackend {
            name: other.to_string(),
        }),
    }
}

/// Build the configured index and load it from `config.path`.
///
/// A path that does not exist yet gives an empty index. A file that exists
/// but cannot be read is an error: the engine cannot serve without its index.
pub fn open_index(config: &VectorConfig) -> LatticeResult<Arc<dyn IVectorIndex>> {
    let index = create_index(config)?;
    if let Some(path) = config.path.as_deref().map(Path::new) {
        if path.exists() {
            index.load(path)?;
            tracing::info!(
                path = %path.display(),
                backend = index.backend_name(),
                vectors = index.len(),
                dims = ?index.dimensions(),
                "vector index loaded"
            );
        } else {
            tracing::info!(path = %path.display(), "no vector index on disk, starting empty");
        }
    }
    Ok(index)
}
