use super::{found, moved_permanently};
use crate::{error::AppError, models::is_valid_key, AppState};
use axum::{
    extract::{Path, State},
    response::Response,
};
use std::sync::Arc;

/// GET /:key
///
/// Known keys get a 301 to their destination. Unknown keys are sent to the
/// add form with a 302 so the visitor can create them.
pub async fn redirect(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    if !is_valid_key(&key) {
        return Err(AppError::InvalidPath);
    }

    match state.store.find(&key).await {
        Some(record) => Ok(moved_permanently(&record.destination)),
        None => {
            tracing::debug!("Unknown shortener '{}', sending to add form", key);
            Ok(found(&format!("/add/{key}")))
        }
    }
}
