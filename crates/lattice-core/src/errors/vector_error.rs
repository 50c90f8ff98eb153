/// Vector index errors.
#[derive(Debug, thiserror::Error)]
pub enum VectorError {
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("empty embedding for {id}")]
    EmptyEmbedding { id: String },

    #[error("non-finite component in embedding for {id}")]
    NonFinite { id: String },

    #[error("unknown vector backend: {name}")]
    UnknownBackend { name: String },
}

impl VectorError {
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::UnknownBackend { .. })
    }
}
