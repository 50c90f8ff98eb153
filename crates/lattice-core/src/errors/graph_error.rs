/// Graph store errors.
///
/// Every failure is explicit so that "the backend is down" can never be
/// confused with "the pattern matched nothing".
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("graph store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("graph {operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("graph connection pool exhausted after waiting {waited_ms}ms")]
    PoolExhausted { waited_ms: u64 },

    #[error("graph {operation} failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        last_error: String,
    },

    #[error("graph query failed: {reason}")]
    QueryFailed { reason: String },

    #[error("invalid graph pattern: {reason}")]
    InvalidPattern { reason: String },
}

impl GraphError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Unavailable { .. } | Self::Timeout { .. } | Self::PoolExhausted { .. }
        )
    }
}
