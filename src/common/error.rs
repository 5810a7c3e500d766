use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum EncoderError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("unknown job status: {0}")]
    InvalidStatus(String),
    #[error("invalid video id: {0:?}")]
    InvalidVideoId(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("{0}")]
    Conflict(String),
    #[error("persistence error: {0}")]
    Persistence(#[from] sqlx::Error),
    #[error("download failed: {0}")]
    Download(String),
    #[error("fragmentation failed: {0}")]
    Fragmentation(String),
    #[error("cleanup failed: {0}")]
    Cleanup(String),
    #[error("processing cancelled")]
    Cancelled,
}

impl EncoderError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        EncoderError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EncoderError>;
