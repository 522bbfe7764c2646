mod dashboard;
mod groups;
mod health;
mod study_activities;
mod study_sessions;
mod words;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Router;

use crate::response::json_error;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/dashboard", dashboard::router())
        .nest("/api/groups", groups::router())
        .nest("/api/study-activities", study_activities::router())
        .nest("/api/study-sessions", study_sessions::router())
        .nest("/api/words", words::router())
        .nest("/health", health::router())
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "route not found").into_response()
}
