use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use jsonbox_store::StoreError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Store(StoreError::InvalidKey { .. }) => StatusCode::BAD_REQUEST,
            Self::Store(StoreError::InvalidDocument(_)) => StatusCode::BAD_REQUEST,
            Self::Store(StoreError::QuotaExceeded { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Store(StoreError::Persistence(_))
            | Self::Config(_)
            | Self::Io(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> String {
        match self {
            Self::Store(StoreError::InvalidKey { .. }) => "Invalid path".into(),
            Self::Store(StoreError::InvalidDocument(_)) => "Invalid JSON data".into(),
            Self::Store(StoreError::NotFound(_)) => "File not found".into(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(%status, "request failed: {self}");
        } else {
            tracing::debug!(%status, "request rejected: {self}");
        }
        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
