//! subcat-api library - read-only catalog query service
//!
//! Serves the canonical substance catalog over HTTP. Never writes; the sync
//! job is the only writer.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

pub use error::ApiError;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::substance_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
