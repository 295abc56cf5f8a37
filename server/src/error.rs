use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::path::PathBuf;

/// Failures of the JSON-backed store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no shortener with key '{0}'")]
    KeyNotFound(String),

    #[error("failed to read store file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed store file {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode shorteners: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write store file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors a handler can return instead of a response.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("404 page not found")]
    InvalidPath,

    #[error("invalid shortener key '{0}': only letters and digits are allowed")]
    InvalidKey(String),

    #[error("invalid destination: it cannot be sent as a redirect location")]
    InvalidDestination,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::InvalidPath => (StatusCode::NOT_FOUND, self.to_string()).into_response(),
            AppError::InvalidKey(_) | AppError::InvalidDestination => {
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            AppError::Store(StoreError::KeyNotFound(_)) => {
                (StatusCode::NOT_FOUND, self.to_string()).into_response()
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}
