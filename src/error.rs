use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageTreeError {
    /// An active-snapshot lookup without exactly one recognised filter.
    #[error("invalid criteria: {0}")]
    InvalidCriteria(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Raised by the backing store; a failed batch has already been rolled
    /// back when this surfaces.
    #[error(transparent)]
    Store(#[from] sqlx::Error),

    #[error("malformed stored value: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PageTreeError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        PageTreeError::NotFound {
            entity,
            key: key.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PageTreeError>;
