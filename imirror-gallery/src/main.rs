//! imirror-gallery - Photo Gallery Coordination Service
//!
//! Serves the gallery HTTP API: filtered views and tag management, preview
//! loading with bounded retry, batch uploads with positional reconciliation,
//! AI photographer summaries, and post-upload interviews. All media records
//! live in the backend Media API; this service holds only view state.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use imirror_common::events::EventBus;
use imirror_gallery::config::{CliArgs, GalleryConfig};
use imirror_gallery::services::media_client::MediaApiClient;
use imirror_gallery::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = CliArgs::parse();
    let config = GalleryConfig::resolve(&args)?;

    info!("Starting imirror-gallery service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Media API: {}", config.media_api_url);

    let client = MediaApiClient::new(config.media_api_url.clone())
        .map_err(|e| anyhow::anyhow!("Failed to build Media API client: {}", e))?;
    let api = Arc::new(client);

    // Event bus for SSE broadcasting
    let event_bus = EventBus::new(100);

    let state = AppState::new(config.clone(), api, event_bus);

    // First load is best effort; the backend may come up after us
    if let Err(e) = state.gallery.reload().await {
        warn!(error = %e, "Initial gallery load failed");
        *state.last_error.write().await = Some(e.to_string());
    }

    let shutdown = state.shutdown.clone();
    let app = imirror_gallery::build_router(state);

    let addr = format!("127.0.0.1:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if tokio::signal::ctrl_c().await.is_err() {
                warn!("Failed to listen for shutdown signal");
            }
            info!("Shutting down");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}
