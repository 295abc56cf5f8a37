use super::found;
use crate::{error::AppError, error::StoreError, models::is_valid_key, AppState};
use askama::Template;
use axum::{
    extract::{Form, Path, State},
    http::HeaderValue,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

// ── Template ───────────────────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "editor.html")]
struct EditorTemplate {
    key: String,
    dest: String,
    is_new: bool,
}

// ── Form types ─────────────────────────────────────────────────────────────

/// Fields posted by the editor form (or passed in the query string on GET).
#[derive(Deserialize)]
pub struct SaveForm {
    #[serde(default)]
    key: String,
    #[serde(default)]
    dest: String,
}

// ── Handlers ───────────────────────────────────────────────────────────────

/// GET /add/:key
pub async fn add(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    if !is_valid_key(&key) {
        return Err(AppError::InvalidPath);
    }

    if state.store.find_index(&key).await.is_some() {
        return Ok(found(&format!("/edit/{key}")));
    }

    Ok(EditorTemplate {
        key,
        dest: String::new(),
        is_new: true,
    }
    .into_response())
}

/// GET /edit/:key
pub async fn edit(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    if !is_valid_key(&key) {
        return Err(AppError::InvalidPath);
    }

    match state.store.find(&key).await {
        Some(record) => Ok(EditorTemplate {
            key: record.key,
            dest: record.destination,
            is_new: false,
        }
        .into_response()),
        None => Ok(found(&format!("/add/{key}"))),
    }
}

/// GET /remove/:key
///
/// Removing a key that does not exist is a no-op; either way the visitor
/// lands on the add form for that key.
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    if !is_valid_key(&key) {
        return Err(AppError::InvalidPath);
    }

    match state.store.remove(&key).await {
        Ok(_) => {}
        Err(StoreError::KeyNotFound(_)) => {
            tracing::warn!("Remove of unknown shortener '{}'", key);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(found(&format!("/add/{key}")))
}

/// GET|POST /save
pub async fn save(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SaveForm>,
) -> Result<Response, AppError> {
    if !is_valid_key(&form.key) {
        return Err(AppError::InvalidKey(form.key));
    }
    if HeaderValue::from_str(&form.dest).is_err() {
        return Err(AppError::InvalidDestination);
    }

    state.store.upsert(&form.key, &form.dest).await?;

    Ok(found(&format!("/edit/{}", form.key)))
}
