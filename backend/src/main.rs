//! VIEWS forecast API - server binary

use std::{sync::Arc, time::Duration};

use forecast_api::{config::Config, create_app, external, services::SnapshotCache, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting VIEWS Forecast API v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Data backend: {}", config.data.backend.as_str());
    tracing::info!("API prefix: {}", config.api.prefix);
    if config.api.key().is_none() {
        tracing::warn!("No API key configured, API routes are open");
    }

    // Create snapshot cache over the configured source
    let source = external::from_config(&config)?;
    let cache = Arc::new(SnapshotCache::new(
        source,
        Duration::from_secs(config.cache.ttl_seconds),
    ));

    // Warm the cache; the service still starts if the data is not there yet
    if let Err(e) = cache.current().await {
        tracing::warn!(error = %e, "Initial forecast load failed");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);

    // Create application state
    let state = AppState {
        cache,
        config: Arc::new(config),
    };

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
