/// Retrieval pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("invalid result count k={k}: must be between 1 and {max}")]
    InvalidK { k: usize, max: usize },

    #[error("query is empty after normalization")]
    EmptyQuery,

    #[error("query embedding failed: {reason}")]
    EmbeddingFailed { reason: String },

    #[error("query {query_id} cancelled")]
    Cancelled { query_id: String },
}

impl RetrievalError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidK { .. } | Self::EmptyQuery)
    }
}
