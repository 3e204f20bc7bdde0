use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("media id is empty")]
    EmptyId,
    #[error("invalid rule: {0}")]
    InvalidRule(String),
    #[error("invalid transformation: {0}")]
    InvalidTransformation(String),
    #[error("not a video asset: {0}")]
    NotAVideo(String),
    #[error("invalid srcset: {0}")]
    InvalidSrcset(String),
}
