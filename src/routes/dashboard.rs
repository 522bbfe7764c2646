use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::{Row, SqlitePool};

use crate::response::AppError;
use crate::session_time::format_timestamp;
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct RecentSessionResponse {
    id: i64,
    group_id: i64,
    activity_name: String,
    created_at: String,
    correct_count: i64,
    wrong_count: i64,
}

#[derive(Debug, Serialize)]
struct QuickStatsResponse {
    total_vocabulary: i64,
    total_words_studied: i64,
    success_rate: f64,
    total_study_sessions: i64,
    total_active_groups: i64,
    study_streak_days: i64,
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/recent-session", get(recent_session))
        .route("/quick_stats", get(quick_stats))
}

/// The most recent session with its activity name and review tallies.
/// No sessions at all is a 404, not an empty object.
async fn recent_session(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let session = select_recent_session(state.pool())
        .await?
        .ok_or_else(|| AppError::not_found("No recent session found"))?;

    Ok(Json(session))
}

async fn quick_stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let pool = state.pool();

    let total_vocabulary: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM words")
        .fetch_one(pool)
        .await?;

    let total_words_studied: i64 =
        sqlx::query_scalar("SELECT COUNT(DISTINCT word_id) FROM word_review_items")
            .fetch_one(pool)
            .await?;

    // AVG over zero rows is NULL; no reviews means a 0.0 rate.
    let success_rate: Option<f64> = sqlx::query_scalar(
        "SELECT AVG(CASE WHEN correct = 1 THEN 1.0 ELSE 0.0 END) FROM word_review_items",
    )
    .fetch_one(pool)
    .await?;

    let total_study_sessions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM study_sessions")
        .fetch_one(pool)
        .await?;

    let total_active_groups: i64 = sqlx::query_scalar(
        "SELECT COUNT(DISTINCT group_id) FROM study_sessions \
         WHERE created_at >= datetime('now', '-30 days')",
    )
    .fetch_one(pool)
    .await?;

    let study_streak_days = current_streak(pool).await?;

    Ok(Json(QuickStatsResponse {
        total_vocabulary,
        total_words_studied,
        success_rate: success_rate.unwrap_or(0.0),
        total_study_sessions,
        total_active_groups,
        study_streak_days,
    }))
}

async fn select_recent_session(
    pool: &SqlitePool,
) -> Result<Option<RecentSessionResponse>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT
            ss.id,
            ss.group_id,
            sa.name AS activity_name,
            ss.created_at,
            COALESCE(SUM(CASE WHEN wri.correct = 1 THEN 1 ELSE 0 END), 0) AS correct_count,
            COALESCE(SUM(CASE WHEN wri.correct = 0 THEN 1 ELSE 0 END), 0) AS wrong_count
        FROM study_sessions ss
        JOIN study_activities sa ON sa.id = ss.study_activity_id
        LEFT JOIN word_review_items wri ON wri.study_session_id = ss.id
        GROUP BY ss.id
        ORDER BY ss.created_at DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let created_at: NaiveDateTime = row.try_get("created_at")?;

    Ok(Some(RecentSessionResponse {
        id: row.try_get("id")?,
        group_id: row.try_get("group_id")?,
        activity_name: row.try_get("activity_name")?,
        created_at: format_timestamp(created_at),
        correct_count: row.try_get("correct_count")?,
        wrong_count: row.try_get("wrong_count")?,
    }))
}

async fn current_streak(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let dates: Vec<NaiveDate> =
        sqlx::query_scalar("SELECT DISTINCT date(created_at) FROM study_sessions")
            .fetch_all(pool)
            .await?;

    Ok(streak_from_dates(dates))
}

/// Length of the run of consecutive calendar dates ending at the most
/// recent studied date. A gap of more than one day breaks the run.
fn streak_from_dates(mut dates: Vec<NaiveDate>) -> i64 {
    dates.sort_unstable();
    dates.dedup();

    let Some(&latest) = dates.last() else {
        return 0;
    };

    let mut streak = 1;
    let mut expected = latest;
    for &date in dates.iter().rev().skip(1) {
        expected = expected - chrono::Duration::days(1);
        if date != expected {
            break;
        }
        streak += 1;
    }

    streak
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn no_studied_dates_means_no_streak() {
        assert_eq!(streak_from_dates(vec![]), 0);
    }

    #[test]
    fn single_date_is_a_streak_of_one() {
        assert_eq!(streak_from_dates(vec![date(2024, 1, 5)]), 1);
    }

    #[test]
    fn gap_before_latest_date_breaks_the_run() {
        let dates = vec![
            date(2024, 1, 1),
            date(2024, 1, 2),
            date(2024, 1, 3),
            date(2024, 1, 5),
        ];
        assert_eq!(streak_from_dates(dates), 1);
    }

    #[test]
    fn consecutive_dates_count_fully() {
        let dates = vec![
            date(2024, 1, 1),
            date(2024, 1, 2),
            date(2024, 1, 3),
            date(2024, 1, 4),
        ];
        assert_eq!(streak_from_dates(dates), 4);
    }

    #[test]
    fn duplicate_and_unordered_dates_are_tolerated() {
        let dates = vec![
            date(2024, 2, 10),
            date(2024, 2, 9),
            date(2024, 2, 10),
            date(2024, 2, 8),
            date(2024, 1, 1),
        ];
        assert_eq!(streak_from_dates(dates), 3);
    }

    #[test]
    fn month_boundaries_are_consecutive() {
        let dates = vec![date(2024, 1, 31), date(2024, 2, 1)];
        assert_eq!(streak_from_dates(dates), 2);
    }
}
