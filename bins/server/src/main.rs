//! Wayfare Settlement Server
//!
//! Main entry point for the settlement service.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wayfare_api::{AppState, create_router};
use wayfare_core::settlement::{InMemorySnapshotStore, TripSnapshot};
use wayfare_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log.filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build snapshot store
    let store = match &config.store.seed_path {
        Some(path) => {
            let snapshots = load_seed(path)?;
            info!(path = %path.display(), trips = snapshots.len(), "Loaded trip snapshots");
            InMemorySnapshotStore::from_snapshots(snapshots)
        }
        None => InMemorySnapshotStore::new(),
    };

    // Create router
    let app = create_router(AppState::new(Arc::new(store)));

    // Start server
    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Reads a JSON array of trip snapshots.
fn load_seed(path: &Path) -> anyhow::Result<Vec<TripSnapshot>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse seed file {}", path.display()))
}
