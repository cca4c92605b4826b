use murmur_core::model::{ActivityId, ScopeId, ScopeType, StreamViewId, StreamViewType};
use murmur_core::ValidationErrors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("core error: {0}")]
    Core(#[from] murmur_core::error::CoreError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("repository not found (searched upward from {0})")]
    RepositoryNotFound(String),

    #[error("repository already exists at {0}")]
    RepositoryExists(String),

    #[error("lock file conflict: {0}")]
    LockConflict(String),

    #[error("composite stream not found: {0}")]
    StreamNotFound(StreamViewId),

    #[error("no loader registered for stream type '{view_type}' (stream {stream_id})")]
    NoLoaderRegistered {
        stream_id: StreamViewId,
        view_type: StreamViewType,
    },

    #[error("stream {0} is not a custom stream")]
    NotCustomStream(StreamViewId),

    #[error("unsupported destination stream type: {0}")]
    UnsupportedDestination(ScopeType),

    #[error("unsupported actor type for resource activity: {0}")]
    UnsupportedActor(ScopeType),

    #[error("person not found: {0}")]
    PersonNotFound(String),

    #[error("group not found: {0}")]
    GroupNotFound(String),

    #[error("organization not found: {0}")]
    OrganizationNotFound(String),

    #[error("activity not found: {0}")]
    ActivityNotFound(ActivityId),

    #[error("stream scope not found: {0}")]
    ScopeNotFound(ScopeId),

    #[error("task queue closed")]
    TaskQueueClosed,

    #[error("cache entry '{key}' is corrupt: {reason}")]
    CorruptCacheEntry { key: String, reason: String },
}

impl StoreError {
    /// Configuration or data-integrity failures.
    ///
    /// These are never retried and carry no field attribution, unlike
    /// [`StoreError::Validation`].
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::StreamNotFound(_)
                | Self::NoLoaderRegistered { .. }
                | Self::NotCustomStream(_)
                | Self::UnsupportedDestination(_)
                | Self::UnsupportedActor(_)
                | Self::PersonNotFound(_)
                | Self::GroupNotFound(_)
                | Self::OrganizationNotFound(_)
                | Self::ActivityNotFound(_)
                | Self::ScopeNotFound(_)
                | Self::CorruptCacheEntry { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
