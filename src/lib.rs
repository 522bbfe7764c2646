pub mod config;
pub mod db;
pub mod logging;
pub mod pagination;
pub mod response;
pub mod routes;
pub mod session_time;
pub mod state;

use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Builds the full application router on top of an already-initialized
/// pool. Integration tests drive this directly via `tower::ServiceExt`.
pub fn create_app(pool: SqlitePool) -> axum::Router {
    routes::router(AppState::new(pool))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
