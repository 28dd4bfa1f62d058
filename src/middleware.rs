use crate::constants::MAX_REWRITE_BODY_SIZE;
use crate::error::AppError;
use crate::error_reporting::E_NOTICE;
use crate::AppState;
use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{header, Method, Request, Response, StatusCode},
    middleware::Next,
};
use std::sync::Arc;

/// Content rewriting middleware
/// Passes every HTML response body through the `the_content` hook
pub async fn rewrite_content(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response<Body>, AppError> {
    let is_head = request.method() == Method::HEAD;
    let response = next.run(request).await;

    if is_head || state.filters.the_content.is_empty() || !is_rewritable(&response) {
        return Ok(response);
    }

    if declared_length(&response).is_some_and(|len| len > MAX_REWRITE_BODY_SIZE) {
        tracing::debug!("Skipping content rewrite: body exceeds {} bytes", MAX_REWRITE_BODY_SIZE);
        return Ok(response);
    }

    let (mut parts, body) = response.into_parts();
    let bytes = to_bytes(body, MAX_REWRITE_BODY_SIZE)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to buffer response body: {}", e))?;

    let content = match String::from_utf8(bytes.to_vec()) {
        Ok(content) => content,
        Err(_) => {
            state
                .config
                .error_reporting()
                .report(E_NOTICE, "Skipping content rewrite: HTML body is not valid UTF-8");
            return Ok(Response::from_parts(parts, Body::from(bytes)));
        }
    };

    let rewritten = state.filters.the_content.apply(content);

    // Drop the stale length; it is recomputed from the new body
    parts.headers.remove(header::CONTENT_LENGTH);
    Ok(Response::from_parts(parts, Body::from(rewritten)))
}

fn declared_length(response: &Response<Body>) -> Option<usize> {
    response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Complete, uncompressed HTML bodies only.
fn is_rewritable(response: &Response<Body>) -> bool {
    if response.status() != StatusCode::OK || response.headers().contains_key(header::CONTENT_ENCODING) {
        return false;
    }
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().to_ascii_lowercase().starts_with("text/html"))
        .unwrap_or(false)
}
