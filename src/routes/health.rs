use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
    uptime_seconds: u64,
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new().route("/", get(health))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database = match sqlx::query("SELECT 1").execute(state.pool()).await {
        Ok(_) => "ok",
        Err(err) => {
            tracing::warn!(error = %err, "health check db ping failed");
            "unavailable"
        }
    };

    let (status_code, status) = if database == "ok" {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status_code,
        Json(HealthResponse {
            status,
            database,
            uptime_seconds: state.uptime_seconds(),
        }),
    )
}
