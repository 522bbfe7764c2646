use std::str::FromStr;

use axum::Router;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tempfile::TempDir;

use lang_portal_backend::db::schema;

pub struct TestApp {
    pub app: Router,
    pub pool: SqlitePool,
    _temp_dir: TempDir,
}

pub async fn create_test_app() -> TestApp {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
    let options = SqliteConnectOptions::from_str(&db_url)
        .expect("invalid sqlite url")
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .expect("failed to create pool");

    schema::run_migrations(&pool).await.expect("migration failed");

    TestApp {
        app: lang_portal_backend::create_app(pool.clone()),
        pool,
        _temp_dir: temp_dir,
    }
}

/// Two groups, three words, one activity, two sessions.
///
/// Session 1 (2024-01-01 10:00) has three reviews, the last at 10:07.
/// Session 2 (2024-01-02 09:00) has none, so its derived end time is
/// 09:30. Per-word tallies: hablar 2/0, comer 0/1, rojo 0/0.
pub async fn seed_fixtures(pool: &SqlitePool) {
    let statements = [
        "INSERT INTO groups (id, name, words_count) VALUES (1, 'Core Verbs', 2)",
        "INSERT INTO groups (id, name, words_count) VALUES (2, 'Core Adjectives', 1)",
        r#"INSERT INTO words (id, spanish, english, parts) VALUES (1, 'hablar', 'to speak', '{"type":"verb"}')"#,
        r#"INSERT INTO words (id, spanish, english, parts) VALUES (2, 'comer', 'to eat', '{"type":"verb"}')"#,
        r#"INSERT INTO words (id, spanish, english, parts) VALUES (3, 'rojo', 'red', '{"type":"adjective"}')"#,
        "INSERT INTO word_groups (word_id, group_id) VALUES (1, 1)",
        "INSERT INTO word_groups (word_id, group_id) VALUES (2, 1)",
        "INSERT INTO word_groups (word_id, group_id) VALUES (3, 2)",
        "INSERT INTO study_activities (id, name, url, preview_url) \
         VALUES (1, 'Flashcards', 'http://localhost:8081/flashcards', 'http://localhost:8081/flashcards/preview.png')",
        "INSERT INTO study_sessions (id, group_id, study_activity_id, created_at) \
         VALUES (1, 1, 1, '2024-01-01 10:00:00')",
        "INSERT INTO study_sessions (id, group_id, study_activity_id, created_at) \
         VALUES (2, 1, 1, '2024-01-02 09:00:00')",
        "INSERT INTO word_review_items (study_session_id, word_id, correct, created_at) \
         VALUES (1, 1, 1, '2024-01-01 10:05:00')",
        "INSERT INTO word_review_items (study_session_id, word_id, correct, created_at) \
         VALUES (1, 2, 0, '2024-01-01 10:06:00')",
        "INSERT INTO word_review_items (study_session_id, word_id, correct, created_at) \
         VALUES (1, 1, 1, '2024-01-01 10:07:00')",
    ];

    for stmt in statements {
        sqlx::query(stmt)
            .execute(pool)
            .await
            .expect("fixture insert failed");
    }
}
