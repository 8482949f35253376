//! goodfood-sync binary entry point

use std::time::Duration;

use goodfood_sync::{AppState, config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application entry point
///
/// # Setup
/// 1. Load configuration from file and environment
/// 2. Initialize tracing/logging
/// 3. Initialize metrics and AppState
/// 4. Run session-start ingestion (optional)
/// 5. Start background refresh (optional)
/// 6. Start HTTP server
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration
    let config = config::AppConfig::load()?;

    // 2. Initialize tracing/logging
    let default_filter = format!("goodfood_sync={},tower_http=debug", config.logging.level);
    if config.logging.format == "json" {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| default_filter.into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| default_filter.into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }

    tracing::info!(
        remote = %config.remote.base_url,
        freshness_window_seconds = config.sync.freshness_window_seconds,
        "Starting goodfood-sync..."
    );

    // 3. Initialize metrics and application state
    goodfood_sync::metrics::init_metrics();
    let state = AppState::new(config.clone()).await?;

    // 4. Session-start ingestion; failure leaves the existing cache in use
    if config.sync.ingest_on_startup {
        if let Err(error) = state.ingest.run().await {
            tracing::error!(%error, "Could not complete bulk refresh, serving cached data");
        }
    }

    // 5. Background refresh
    if config.sync.refresh_interval_seconds > 0 {
        state
            .ingest
            .clone()
            .spawn_refresh(Duration::from_secs(config.sync.refresh_interval_seconds));
    }

    // 6. Start HTTP server
    let app = goodfood_sync::build_router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Local API listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
