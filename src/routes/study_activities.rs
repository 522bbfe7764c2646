use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
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
struct ActivityResponse {
    id: i64,
    title: String,
    launch_url: String,
    preview_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct ActivitySessionItem {
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
struct ActivitySessionListResponse {
    items: Vec<ActivitySessionItem>,
    total: i64,
    page: i64,
    per_page: i64,
    total_pages: i64,
}

#[derive(Debug, Serialize)]
struct LaunchGroup {
    id: i64,
    name: String,
}

#[derive(Debug, Serialize)]
struct ActivityLaunchResponse {
    activity: ActivityResponse,
    groups: Vec<LaunchGroup>,
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(list_activities))
        .route("/:id", get(get_activity))
        .route("/:id/sessions", get(get_activity_sessions))
        .route("/:id/launch", get(get_activity_launch))
}

async fn list_activities(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let rows = sqlx::query("SELECT id, name, url, preview_url FROM study_activities")
        .fetch_all(state.pool())
        .await?;

    let activities = rows
        .iter()
        .map(map_activity)
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

    Ok(Json(activities))
}

async fn get_activity(
    State(state): State<AppState>,
    Path(activity_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let activity = select_activity(state.pool(), activity_id)
        .await?
        .ok_or_else(|| AppError::not_found("Activity not found"))?;

    Ok(Json(activity))
}

async fn get_activity_sessions(
    State(state): State<AppState>,
    Path(activity_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let window = PageWindow::from_query(&query, DEFAULT_PER_PAGE)?;

    let pool = state.pool();

    select_activity(pool, activity_id)
        .await?
        .ok_or_else(|| AppError::not_found("Activity not found"))?;

    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM study_sessions WHERE study_activity_id = ?")
            .bind(activity_id)
            .fetch_one(pool)
            .await?;

    let rows = sqlx::query(
        r#"
        SELECT
            ss.id,
            ss.group_id,
            g.name AS group_name,
            ss.study_activity_id AS activity_id,
            sa.name AS activity_name,
            ss.created_at,
            MAX(wri.created_at) AS last_activity_time,
            COUNT(wri.id) AS review_items_count
        FROM study_sessions ss
        JOIN groups g ON g.id = ss.group_id
        JOIN study_activities sa ON sa.id = ss.study_activity_id
        LEFT JOIN word_review_items wri ON wri.study_session_id = ss.id
        WHERE ss.study_activity_id = ?
        GROUP BY ss.id
        ORDER BY ss.created_at DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(activity_id)
    .bind(window.per_page)
    .bind(window.offset())
    .fetch_all(pool)
    .await?;

    let items = rows
        .iter()
        .map(|row| {
            let start: NaiveDateTime = row.try_get("created_at")?;
            let last_activity: Option<NaiveDateTime> = row.try_get("last_activity_time")?;
            let end = derive_end_time(start, last_activity);

            Ok(ActivitySessionItem {
                id: row.try_get("id")?,
                group_id: row.try_get("group_id")?,
                group_name: row.try_get("group_name")?,
                activity_id: row.try_get("activity_id")?,
                activity_name: row.try_get("activity_name")?,
                start_time: format_timestamp(start),
                end_time: format_timestamp(end),
                review_items_count: row.try_get("review_items_count")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

    Ok(Json(ActivitySessionListResponse {
        items,
        total,
        page: window.page,
        per_page: window.per_page,
        total_pages: pagination::total_pages(total, window.per_page),
    }))
}

async fn get_activity_launch(
    State(state): State<AppState>,
    Path(activity_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let pool = state.pool();

    let activity = select_activity(pool, activity_id)
        .await?
        .ok_or_else(|| AppError::not_found("Activity not found"))?;

    let rows = sqlx::query("SELECT id, name FROM groups")
        .fetch_all(pool)
        .await?;

    let groups = rows
        .iter()
        .map(|row| {
            Ok(LaunchGroup {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

    Ok(Json(ActivityLaunchResponse { activity, groups }))
}

async fn select_activity(
    pool: &SqlitePool,
    activity_id: i64,
) -> Result<Option<ActivityResponse>, sqlx::Error> {
    let row = sqlx::query("SELECT id, name, url, preview_url FROM study_activities WHERE id = ?")
        .bind(activity_id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(map_activity).transpose()
}

fn map_activity(row: &SqliteRow) -> Result<ActivityResponse, sqlx::Error> {
    Ok(ActivityResponse {
        id: row.try_get("id")?,
        title: row.try_get("name")?,
        launch_url: row.try_get("url")?,
        preview_url: row.try_get("preview_url")?,
    })
}
