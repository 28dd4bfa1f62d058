use crate::error::{AppError, Result};
use crate::models::HealthResponse;
use crate::AppState;
use axum::{
    extract::{OriginalUri, State},
    response::Redirect,
    Json,
};
use std::sync::Arc;

/// Health check endpoint
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment,
        rewriting: state.rewriting(),
    })
}

/// Fallback for upload requests the local directory can't satisfy.
///
/// The request is mapped back onto the configured uploads base URL and sent
/// through the `attachment_url` hook; if it comes back pointing elsewhere
/// the client is redirected there.
pub async fn remote_fallback(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
) -> Result<Redirect> {
    let path = uri.path();
    if path.split('/').any(|segment| segment == "..") {
        return Err(AppError::BadRequest("Invalid upload path".to_string()));
    }

    let uploads_path = state.config.uploads_path();
    let relative = path.strip_prefix(uploads_path.as_str()).unwrap_or(path);
    let local_url = match uri.query() {
        Some(query) => format!("{}{}?{}", state.config.upload_dir.base_url, relative, query),
        None => format!("{}{}", state.config.upload_dir.base_url, relative),
    };

    let remote_url = state.filters.attachment_url.apply(local_url.clone());
    if remote_url == local_url {
        return Err(AppError::NotFound);
    }

    tracing::debug!("Redirecting missing upload {} to {}", path, remote_url);
    Ok(Redirect::temporary(&remote_url))
}
