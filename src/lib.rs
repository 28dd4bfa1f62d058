//! Local development helpers for a media site: missing uploads are served
//! from a remote host, both by rewriting URLs in pages and by redirecting
//! requests for files that aren't on disk.

use axum::{middleware::from_fn_with_state, routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod constants;
pub mod error;
pub mod error_reporting;
pub mod filters;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod plugin;
pub mod rewriter;

use config::Config;
use filters::FilterTable;

/// Shared per-process state: immutable once built.
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    pub filters: FilterTable,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let mut filters = FilterTable::new();
        plugin::register(&config, &mut filters);
        Self { config, filters }
    }

    pub fn rewriting(&self) -> bool {
        !self.filters.is_empty()
    }
}

/// Build the dev server router.
pub fn app(state: Arc<AppState>) -> Router {
    let uploads = ServeDir::new(&state.config.upload_dir.base_dir)
        .fallback(get(handlers::remote_fallback).with_state(Arc::clone(&state)));

    Router::new()
        .route("/api/health", get(handlers::health))
        .nest_service(&state.config.uploads_path(), uploads)
        .fallback_service(ServeDir::new(&state.config.site_root))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn_with_state(Arc::clone(&state), middleware::rewrite_content)),
        )
        .with_state(state)
}
