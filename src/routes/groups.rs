use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{Row, SqlitePool};

use crate::pagination::{self, ListQuery, PageWindow, SortOrder, SortSpec};
use crate::response::AppError;
use crate::session_time::{derive_end_time, format_timestamp};
use crate::state::AppState;

const DEFAULT_PER_PAGE: i64 = 10;

const GROUP_SORT: SortSpec = SortSpec::new(
    &[("name", "name"), ("words_count", "words_count")],
    "name",
    SortOrder::Asc,
);

const GROUP_WORD_SORT: SortSpec = SortSpec::new(
    &[
        ("spanish", "w.spanish"),
        ("english", "w.english"),
        ("correct_count", "correct_count"),
        ("wrong_count", "wrong_count"),
    ],
    "w.spanish",
    SortOrder::Asc,
);

const GROUP_SESSION_SORT: SortSpec = SortSpec::new(
    &[
        ("created_at", "ss.created_at"),
        ("last_activity_time", "last_activity_time"),
        ("activity_name", "sa.name"),
        ("group_name", "g.name"),
        ("review_count", "review_items_count"),
    ],
    "ss.created_at",
    SortOrder::Desc,
);

#[derive(Debug, Serialize)]
struct GroupResponse {
    id: i64,
    group_name: String,
    word_count: i64,
}

#[derive(Debug, Serialize)]
struct GroupListResponse {
    groups: Vec<GroupResponse>,
    total_pages: i64,
    current_page: i64,
}

#[derive(Debug, Serialize)]
struct GroupWordStats {
    id: i64,
    spanish: String,
    english: String,
    correct_count: i64,
    wrong_count: i64,
}

#[derive(Debug, Serialize)]
struct GroupWordListResponse {
    words: Vec<GroupWordStats>,
    total_pages: i64,
    current_page: i64,
}

#[derive(Debug, Serialize)]
struct GroupSessionResponse {
    id: i64,
    group_id: i64,
    group_name: String,
    study_activity_id: i64,
    activity_name: String,
    start_time: String,
    end_time: String,
    review_items_count: i64,
}

#[derive(Debug, Serialize)]
struct GroupSessionListResponse {
    study_sessions: Vec<GroupSessionResponse>,
    total_pages: i64,
    current_page: i64,
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(list_groups))
        .route("/:id", get(get_group))
        .route("/:id/words", get(get_group_words))
        .route("/:id/study_sessions", get(get_group_study_sessions))
}

async fn list_groups(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let window = PageWindow::from_query(&query, DEFAULT_PER_PAGE)?;
    let (sort_column, sort_order) =
        GROUP_SORT.resolve(query.sort_by.as_deref(), query.order.as_deref());

    let pool = state.pool();

    let total_groups: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM groups")
        .fetch_one(pool)
        .await?;

    // words_count is the seed-time cache, returned as-is.
    let sql = format!(
        "SELECT id, name, words_count FROM groups \
         ORDER BY {sort_column} {sort_order} LIMIT ? OFFSET ?"
    );

    let rows = sqlx::query(&sql)
        .bind(window.per_page)
        .bind(window.offset())
        .fetch_all(pool)
        .await?;

    let groups = rows
        .iter()
        .map(|row| {
            Ok(GroupResponse {
                id: row.try_get("id")?,
                group_name: row.try_get("name")?,
                word_count: row.try_get("words_count")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

    Ok(Json(GroupListResponse {
        groups,
        total_pages: pagination::total_pages(total_groups, window.per_page),
        current_page: window.page,
    }))
}

async fn get_group(
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let row = sqlx::query("SELECT id, name, words_count FROM groups WHERE id = ?")
        .bind(group_id)
        .fetch_optional(state.pool())
        .await?
        .ok_or_else(|| AppError::not_found("Group not found"))?;

    Ok(Json(GroupResponse {
        id: row.try_get("id")?,
        group_name: row.try_get("name")?,
        word_count: row.try_get("words_count")?,
    }))
}

async fn get_group_words(
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let window = PageWindow::from_query(&query, DEFAULT_PER_PAGE)?;
    let (sort_column, sort_order) =
        GROUP_WORD_SORT.resolve(query.sort_by.as_deref(), query.order.as_deref());

    let pool = state.pool();
    ensure_group_exists(pool, group_id).await?;

    let total_words: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM word_groups WHERE group_id = ?")
            .bind(group_id)
            .fetch_one(pool)
            .await?;

    let sql = format!(
        r#"
        SELECT w.id, w.spanish, w.english,
               COALESCE(SUM(CASE WHEN wri.correct = 1 THEN 1 ELSE 0 END), 0) AS correct_count,
               COALESCE(SUM(CASE WHEN wri.correct = 0 THEN 1 ELSE 0 END), 0) AS wrong_count
        FROM words w
        JOIN word_groups wg ON wg.word_id = w.id
        LEFT JOIN word_review_items wri ON wri.word_id = w.id
        WHERE wg.group_id = ?
        GROUP BY w.id
        ORDER BY {sort_column} {sort_order}
        LIMIT ? OFFSET ?
        "#
    );

    let rows = sqlx::query(&sql)
        .bind(group_id)
        .bind(window.per_page)
        .bind(window.offset())
        .fetch_all(pool)
        .await?;

    let words = rows
        .iter()
        .map(|row| {
            Ok(GroupWordStats {
                id: row.try_get("id")?,
                spanish: row.try_get("spanish")?,
                english: row.try_get("english")?,
                correct_count: row.try_get("correct_count")?,
                wrong_count: row.try_get("wrong_count")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

    Ok(Json(GroupWordListResponse {
        words,
        total_pages: pagination::total_pages(total_words, window.per_page),
        current_page: window.page,
    }))
}

async fn get_group_study_sessions(
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let window = PageWindow::from_query(&query, DEFAULT_PER_PAGE)?;
    let (sort_column, sort_order) =
        GROUP_SESSION_SORT.resolve(query.sort_by.as_deref(), query.order.as_deref());

    let pool = state.pool();
    ensure_group_exists(pool, group_id).await?;

    let total_sessions: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM study_sessions WHERE group_id = ?")
            .bind(group_id)
            .fetch_one(pool)
            .await?;

    let sql = format!(
        r#"
        SELECT
            ss.id,
            ss.group_id,
            g.name AS group_name,
            ss.study_activity_id,
            sa.name AS activity_name,
            ss.created_at,
            MAX(wri.created_at) AS last_activity_time,
            COUNT(wri.id) AS review_items_count
        FROM study_sessions ss
        JOIN study_activities sa ON sa.id = ss.study_activity_id
        JOIN groups g ON g.id = ss.group_id
        LEFT JOIN word_review_items wri ON wri.study_session_id = ss.id
        WHERE ss.group_id = ?
        GROUP BY ss.id
        ORDER BY {sort_column} {sort_order}
        LIMIT ? OFFSET ?
        "#
    );

    let rows = sqlx::query(&sql)
        .bind(group_id)
        .bind(window.per_page)
        .bind(window.offset())
        .fetch_all(pool)
        .await?;

    let study_sessions = rows
        .iter()
        .map(|row| {
            let start: NaiveDateTime = row.try_get("created_at")?;
            let last_activity: Option<NaiveDateTime> = row.try_get("last_activity_time")?;
            let end = derive_end_time(start, last_activity);

            Ok(GroupSessionResponse {
                id: row.try_get("id")?,
                group_id: row.try_get("group_id")?,
                group_name: row.try_get("group_name")?,
                study_activity_id: row.try_get("study_activity_id")?,
                activity_name: row.try_get("activity_name")?,
                start_time: format_timestamp(start),
                end_time: format_timestamp(end),
                review_items_count: row.try_get("review_items_count")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

    Ok(Json(GroupSessionListResponse {
        study_sessions,
        total_pages: pagination::total_pages(total_sessions, window.per_page),
        current_page: window.page,
    }))
}

/// Listing words or sessions of an unknown group is a 404, never an
/// empty page.
async fn ensure_group_exists(pool: &SqlitePool, group_id: i64) -> Result<(), AppError> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM groups WHERE id = ?")
        .bind(group_id)
        .fetch_optional(pool)
        .await?;

    match exists {
        Some(_) => Ok(()),
        None => Err(AppError::not_found("Group not found")),
    }
}
