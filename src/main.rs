use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Router};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stenella::config::Config;
use stenella::fetcher::Fetcher;
use stenella::registry::SourceRegistry;
use stenella::routes::{self, AppState};

const CONFIG_PATH: &str = "stenella.toml";

/// Routes served alongside the built-in UI and API. Register new handlers
/// here; they are mounted before the listener starts.
fn extra_routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(routes::health))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stenella=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; without a file the built-in defaults apply
    let config = Config::load_or_default(CONFIG_PATH)
        .with_context(|| format!("failed to load {}", CONFIG_PATH))?;

    let poll_interval = config.poll_interval()?;

    let registry = Arc::new(SourceRegistry::new(config.sources.clone()));
    info!("Starting with {} feed sources", registry.list().await.len());

    let timeout = config.fetch_timeout();
    if timeout.is_none() {
        warn!("Fetch timeout disabled; a stalled feed will hang its request");
    }
    let fetcher = Arc::new(Fetcher::new(timeout)?);

    let state = Arc::new(AppState {
        registry,
        fetcher,
        poll_interval,
    });
    let app = routes::build_router(state, extra_routes());

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!("Stenella listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
