use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid checksum: {0}")]
    InvalidChecksum(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unknown snapshot kind: {0}")]
    UnknownKind(String),

    #[error("integrity check failed: expected {expected}, got {actual}")]
    Integrity { expected: String, actual: String },

    #[error("unknown scope type: {0}")]
    UnknownScopeType(String),

    #[error("unknown stream view type: {0}")]
    UnknownStreamViewType(String),
}
