use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::pagination::{self, ListQuery, PageWindow, SortOrder, SortSpec};
use crate::response::AppError;
use crate::state::AppState;

const DEFAULT_PER_PAGE: i64 = 50;

const WORD_SORT: SortSpec = SortSpec::new(
    &[
        ("spanish", "w.spanish"),
        ("english", "w.english"),
        ("correct_count", "correct_count"),
        ("wrong_count", "wrong_count"),
    ],
    "w.spanish",
    SortOrder::Asc,
);

#[derive(Debug, Serialize)]
struct WordStats {
    id: i64,
    spanish: String,
    english: String,
    correct_count: i64,
    wrong_count: i64,
}

#[derive(Debug, Serialize)]
struct WordListResponse {
    words: Vec<WordStats>,
    total_pages: i64,
    current_page: i64,
    total_words: i64,
}

#[derive(Debug, Serialize)]
struct WordGroup {
    id: i64,
    name: String,
}

#[derive(Debug, Serialize)]
struct WordDetailResponse {
    id: i64,
    spanish: String,
    english: String,
    correct_count: i64,
    wrong_count: i64,
    groups: Vec<WordGroup>,
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(list_words))
        .route("/:id", get(get_word))
}

async fn list_words(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let window = PageWindow::from_query(&query, DEFAULT_PER_PAGE)?;
    let (sort_column, sort_order) =
        WORD_SORT.resolve(query.sort_by.as_deref(), query.order.as_deref());

    let pool = state.pool();

    let total_words: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM words")
        .fetch_one(pool)
        .await?;

    let words = select_word_stats(pool, sort_column, sort_order, &window).await?;

    Ok(Json(WordListResponse {
        words,
        total_pages: pagination::total_pages(total_words, window.per_page),
        current_page: window.page,
        total_words,
    }))
}

async fn get_word(
    State(state): State<AppState>,
    Path(word_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let pool = state.pool();

    let row = sqlx::query(
        r#"
        SELECT w.id, w.spanish, w.english,
               COALESCE(SUM(CASE WHEN wri.correct = 1 THEN 1 ELSE 0 END), 0) AS correct_count,
               COALESCE(SUM(CASE WHEN wri.correct = 0 THEN 1 ELSE 0 END), 0) AS wrong_count
        FROM words w
        LEFT JOIN word_review_items wri ON wri.word_id = w.id
        WHERE w.id = ?
        GROUP BY w.id
        "#,
    )
    .bind(word_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("Word not found"))?;

    let stats = map_word_stats(&row)?;

    // Group membership comes from a second query so the review counts
    // above are not multiplied by the number of groups.
    let groups = select_word_groups(pool, word_id).await?;

    Ok(Json(WordDetailResponse {
        id: stats.id,
        spanish: stats.spanish,
        english: stats.english,
        correct_count: stats.correct_count,
        wrong_count: stats.wrong_count,
        groups,
    }))
}

async fn select_word_stats(
    pool: &SqlitePool,
    sort_column: &str,
    sort_order: &str,
    window: &PageWindow,
) -> Result<Vec<WordStats>, sqlx::Error> {
    // sort_column and sort_order come from the SortSpec allow-list,
    // never from the caller.
    let sql = format!(
        r#"
        SELECT w.id, w.spanish, w.english,
               COALESCE(SUM(CASE WHEN wri.correct = 1 THEN 1 ELSE 0 END), 0) AS correct_count,
               COALESCE(SUM(CASE WHEN wri.correct = 0 THEN 1 ELSE 0 END), 0) AS wrong_count
        FROM words w
        LEFT JOIN word_review_items wri ON wri.word_id = w.id
        GROUP BY w.id
        ORDER BY {sort_column} {sort_order}
        LIMIT ? OFFSET ?
        "#
    );

    let rows = sqlx::query(&sql)
        .bind(window.per_page)
        .bind(window.offset())
        .fetch_all(pool)
        .await?;

    rows.iter().map(map_word_stats).collect()
}

async fn select_word_groups(
    pool: &SqlitePool,
    word_id: i64,
) -> Result<Vec<WordGroup>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT g.id, g.name
        FROM word_groups wg
        JOIN groups g ON g.id = wg.group_id
        WHERE wg.word_id = ?
        ORDER BY g.name
        "#,
    )
    .bind(word_id)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(WordGroup {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
            })
        })
        .collect()
}

fn map_word_stats(row: &SqliteRow) -> Result<WordStats, sqlx::Error> {
    Ok(WordStats {
        id: row.try_get("id")?,
        spanish: row.try_get("spanish")?,
        english: row.try_get("english")?,
        correct_count: row.try_get("correct_count")?,
        wrong_count: row.try_get("wrong_count")?,
    })
}
