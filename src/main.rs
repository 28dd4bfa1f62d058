use rewrite_media::config::Config;
use rewrite_media::constants::DEFAULT_LOG_FILTER;
use rewrite_media::{app, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!(
        "Environment: {}, error reporting mask: {}",
        config.environment,
        config.error_reporting().mask()
    );

    if !config.upload_dir.base_dir.is_dir() {
        tracing::warn!(
            "Uploads directory {} does not exist; every upload will be treated as missing",
            config.upload_dir.base_dir.display()
        );
    }

    let port = config.port;
    let state = Arc::new(AppState::new(config));
    let app = app(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!("rewrite-media listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
