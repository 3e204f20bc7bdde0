use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

/// JSON error response: `{ "error": title, "detail": message }`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &str, detail: Option<String>) -> Self {
        Self { status, body: ErrorBody { error: title.to_string(), detail } }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(detail.into()))
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some("missing or invalid API key".into()))
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let detail = Some(e.to_string());
        match &e {
            ServiceError::Validation(_) => Self::new(StatusCode::BAD_REQUEST, "Validation Error", detail),
            ServiceError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "Not Found", detail),
            ServiceError::Media(_) if e.is_client_error() => {
                Self::new(StatusCode::BAD_REQUEST, "Invalid Media Request", detail)
            }
            ServiceError::Upstream(_) => Self::new(StatusCode::BAD_GATEWAY, "Upstream Error", detail),
            _ => Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", detail),
        }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.body.error, detail = ?self.body.detail, "request failed");
        }
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("runtime check failed: {0}")]
    Runtime(String),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
