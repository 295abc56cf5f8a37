use crate::error::AppError;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

pub mod editor;
pub mod help;
pub mod redirect;

// axum's `Redirect` only speaks 303/307/308; the shortener contract is 301/302.

/// 301 Moved Permanently to `location`.
pub(crate) fn moved_permanently(location: &str) -> Response {
    redirect_with(StatusCode::MOVED_PERMANENTLY, location)
}

/// 302 Found to `location`.
pub(crate) fn found(location: &str) -> Response {
    redirect_with(StatusCode::FOUND, location)
}

/// A redirect must carry its `Location`; records hand-edited into the store
/// file can still hold bytes a header cannot, and those answer 500.
fn redirect_with(status: StatusCode, location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (status, [(header::LOCATION, value)]).into_response(),
        Err(e) => {
            tracing::error!("Cannot redirect to {:?}: {}", location, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        }
    }
}

/// Fallback for every path no route matches, including `/` itself.
pub async fn not_found() -> AppError {
    AppError::InvalidPath
}
