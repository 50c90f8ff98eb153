mod cache_error;
mod config_error;
mod graph_error;
mod persistence_error;
mod retrieval_error;
mod vector_error;

pub use cache_error::CacheError;
pub use config_error::ConfigError;
pub use graph_error::GraphError;
pub use persistence_error::PersistenceError;
pub use retrieval_error::RetrievalError;
pub use vector_error::VectorError;

/// Top-level error for the Lattice engine.
///
/// Only validation failures and unrecoverable startup failures are meant to
/// reach a caller. Cache and graph failures are absorbed by the components
/// that own them and show up as degraded service instead.
#[derive(Debug, thiserror::Error)]
pub enum LatticeError {
    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("cache error: {0}")]
    CacheError(#[from] CacheError),

    #[error("vector index error: {0}")]
    VectorError(#[from] VectorError),

    #[error("graph store error: {0}")]
    GraphError(#[from] GraphError),

    #[error("persistence error: {0}")]
    PersistenceError(#[from] PersistenceError),

    #[error("retrieval error: {0}")]
    RetrievalError(#[from] RetrievalError),

    #[error("config error: {0}")]
    ConfigError(#[from] ConfigError),
}

impl LatticeError {
    /// Caller supplied something unusable. Never retried.
    pub fn is_validation(&self) -> bool {
        match self {
            Self::ValidationError(_) => true,
            Self::VectorError(e) => e.is_validation(),
            Self::RetrievalError(e) => e.is_validation(),
            _ => false,
        }
    }

    /// Transient backend failure worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::GraphError(e) => e.is_retryable(),
            Self::CacheError(_) => true,
            _ => false,
        }
    }
}

pub type LatticeResult<T> = Result<T, LatticeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_mismatch_is_validation() {
        let err: LatticeError = VectorError::DimensionMismatch {
            expected: 3,
            actual: 4,
        }
        .into();
        assert!(err.is_validation());
        assert!(!err.is_retryable());
        assert_eq!(
            err.to_string(),
            "vector index error: dimension mismatch: expected 3, got 4"
        );
    }

    #[test]
    fn invalid_k_is_validation() {
        let err: LatticeError = RetrievalError::InvalidK { k: 0, max: 100 }.into();
        assert!(err.is_validation());
    }

    #[test]
    fn graph_timeout_is_retryable_but_pattern_is_not() {
        let timeout: LatticeError = GraphError::Timeout {
            operation: "query".into(),
            timeout_ms: 10,
        }
        .into();
        assert!(timeout.is_retryable());

        let pattern: LatticeError = GraphError::InvalidPattern {
            reason: "no start ids".into(),
        }
        .into();
        assert!(!pattern.is_retryable());
        assert!(!pattern.is_validation());
    }
}
