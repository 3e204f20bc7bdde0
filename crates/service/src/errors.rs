use media::MediaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error(transparent)]
    Media(#[from] MediaError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    /// Whether the caller sent something unusable (as opposed to a server fault).
    pub fn is_client_error(&self) -> bool {
        match self {
            ServiceError::Validation(_) | ServiceError::NotFound(_) => true,
            ServiceError::Media(e) => !matches!(e, MediaError::InvalidRule(_)),
            _ => false,
        }
    }
}
