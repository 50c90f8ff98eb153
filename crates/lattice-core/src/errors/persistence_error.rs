/// Vector index persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("io error on {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("corrupt index file {path}: {reason}")]
    Corrupt { path: String, reason: String },

    #[error("sqlite error: {reason}")]
    Sqlite { reason: String },
}
