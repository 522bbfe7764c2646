use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Json;
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::pagination::{self, ListQuery, PageWindow};
use crate::response::AppError;
use crate::session_time::{derive_end_time, format_timestamp};
use crate::state::AppState;

const DEFAULT_PER_PAGE: i64 = 10;

#[derive(Debug, Serialize)]
struct SessionListItem {
    id: i64,
    group_id: i64,
    group_name: String,
    activity_id: i64,
    activity_name: String,
    start_time: String,
    end_time: String,
    review_items_count: i64,
}

#[derive(Debug, Serialize)]
struct SessionListResponse {
    items: Vec<SessionListItem>,
    total: i64,
    page: i64,
    per_page: i64,
    total_pages: i64,
}

#[derive(Debug, Serialize)]
struct SessionWordStats {
    id: i64,
    spanish: String,
    english: String,
    correct_count: i64,
    wrong_count: i64,
}

#[derive(Debug, Serialize)]
struct SessionDetailResponse {
    session: SessionListItem,
    words: Vec<SessionWordStats>,
    total: i64,
    page: i64,
    per_page: i64,
    total_pages: i64,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: &'static str,
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(list_sessions))
        .route("/reset", post(reset_history))
        .route("/:id", get(get_session))
}

async fn list_sessions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let window = PageWindow::from_query(&query, DEFAULT_PER_PAGE)?;

    let pool = state.pool();

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM study_sessions ss
        JOIN groups g ON g.id = ss.group_id
        JOIN study_activities sa ON sa.id = ss.study_activity_id
        "#,
    )
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query(&format!(
        "{SESSION_SELECT} GROUP BY ss.id ORDER BY ss.created_at DESC LIMIT ? OFFSET ?"
    ))
    .bind(window.per_page)
    .bind(window.offset())
    .fetch_all(pool)
    .await?;

    let items = rows
        .iter()
        .map(map_session_item)
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

    Ok(Json(SessionListResponse {
        items,
        total,
        page: window.page,
        per_page: window.per_page,
        total_pages: pagination::total_pages(total, window.per_page),
    }))
}

/// Session summary plus a paginated page of per-word stats for the
/// reviews recorded in this session.
async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let window = PageWindow::from_query(&query, DEFAULT_PER_PAGE)?;

    let pool = state.pool();

    let row = sqlx::query(&format!("{SESSION_SELECT} WHERE ss.id = ? GROUP BY ss.id"))
        .bind(session_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("Study session not found"))?;

    let session = map_session_item(&row)?;

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(DISTINCT word_id) FROM word_review_items WHERE study_session_id = ?",
    )
    .bind(session_id)
    .fetch_one(pool)
    .await?;

    let words = select_session_words(pool, session_id, &window).await?;

    Ok(Json(SessionDetailResponse {
        session,
        words,
        total,
        page: window.page,
        per_page: window.per_page,
        total_pages: pagination::total_pages(total, window.per_page),
    }))
}

/// Clears the entire study history: every review item, then every
/// session, as one transaction. Rerunning against an empty history is
/// a no-op success.
async fn reset_history(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut tx = state.pool().begin().await?;

    sqlx::query("DELETE FROM word_review_items")
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM study_sessions")
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!("study history cleared");

    Ok(Json(MessageResponse {
        message: "Study history cleared successfully",
    }))
}

const SESSION_SELECT: &str = r#"
    SELECT
        ss.id,
        ss.group_id,
        g.name AS group_name,
        sa.id AS activity_id,
        sa.name AS activity_name,
        ss.created_at,
        MAX(wri.created_at) AS last_activity_time,
        COUNT(wri.id) AS review_items_count
    FROM study_sessions ss
    JOIN groups g ON g.id = ss.group_id
    JOIN study_activities sa ON sa.id = ss.study_activity_id
    LEFT JOIN word_review_items wri ON wri.study_session_id = ss.id
"#;

async fn select_session_words(
    pool: &SqlitePool,
    session_id: i64,
    window: &PageWindow,
) -> Result<Vec<SessionWordStats>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT w.id, w.spanish, w.english,
               COALESCE(SUM(CASE WHEN wri.correct = 1 THEN 1 ELSE 0 END), 0) AS correct_count,
               COALESCE(SUM(CASE WHEN wri.correct = 0 THEN 1 ELSE 0 END), 0) AS wrong_count
        FROM words w
        JOIN word_review_items wri ON wri.word_id = w.id
        WHERE wri.study_session_id = ?
        GROUP BY w.id
        ORDER BY w.spanish
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(session_id)
    .bind(window.per_page)
    .bind(window.offset())
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(SessionWordStats {
                id: row.try_get("id")?,
                spanish: row.try_get("spanish")?,
                english: row.try_get("english")?,
                correct_count: row.try_get("correct_count")?,
                wrong_count: row.try_get("wrong_count")?,
            })
        })
        .collect()
}

fn map_session_item(row: &SqliteRow) -> Result<SessionListItem, sqlx::Error> {
    let start: NaiveDateTime = row.try_get("created_at")?;
    let last_activity: Option<NaiveDateTime> = row.try_get("last_activity_time")?;
    let end = derive_end_time(start, last_activity);

    Ok(SessionListItem {
        id: row.try_get("id")?,
        group_id: row.try_get("group_id")?,
        group_name: row.try_get("group_name")?,
        activity_id: row.try_get("activity_id")?,
        activity_name: row.try_get("activity_name")?,
        start_time: format_timestamp(start),
        end_time: format_timestamp(end),
        review_items_count: row.try_get("review_items_count")?,
    })
}
