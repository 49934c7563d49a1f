//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - Settlement routes (preview and persisted summaries)
//! - Health check
//! - Error responses mapped from the shared error taxonomy
//!
//! Authentication and trip access checks happen upstream of these routes.

pub mod error;
pub mod routes;

use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use wayfare_core::settlement::SnapshotStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Read access to persisted trip records.
    pub store: Arc<dyn SnapshotStore>,
}

impl AppState {
    /// Creates state backed by the given snapshot store.
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
