use std::path::Path;

use serde::Deserialize;
use sqlx::types::Json;
use sqlx::SqlitePool;
use thiserror::Error;

#[derive(Debug, Deserialize)]
pub struct SeedWord {
    pub spanish: String,
    pub english: String,
    #[serde(default)]
    pub parts: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct SeedActivity {
    pub name: String,
    pub url: String,
    pub preview_url: String,
}

/// Imports the standard seed files relative to `seed_dir`.
pub async fn run_seed(pool: &SqlitePool, seed_dir: &str) -> Result<(), SeedError> {
    let dir = Path::new(seed_dir);

    import_words(
        pool,
        "Core Verbs",
        &load_json::<Vec<SeedWord>>(&dir.join("data_verbs.json"))?,
    )
    .await?;
    import_words(
        pool,
        "Core Adjectives",
        &load_json::<Vec<SeedWord>>(&dir.join("data_adjectives.json"))?,
    )
    .await?;
    import_study_activities(
        pool,
        &load_json::<Vec<SeedActivity>>(&dir.join("study_activities.json"))?,
    )
    .await?;

    Ok(())
}

/// Inserts a group, its words (with `parts` serialized into the single
/// JSON text column), and the join rows, then refreshes the group's
/// cached word count. The whole import is one transaction.
pub async fn import_words(
    pool: &SqlitePool,
    group_name: &str,
    words: &[SeedWord],
) -> Result<i64, SeedError> {
    let mut tx = pool.begin().await?;

    let group_id = sqlx::query("INSERT INTO groups (name) VALUES (?)")
        .bind(group_name)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

    for word in words {
        let word_id = sqlx::query("INSERT INTO words (spanish, english, parts) VALUES (?, ?, ?)")
            .bind(&word.spanish)
            .bind(&word.english)
            .bind(Json(&word.parts))
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        sqlx::query("INSERT INTO word_groups (word_id, group_id) VALUES (?, ?)")
            .bind(word_id)
            .bind(group_id)
            .execute(&mut *tx)
            .await?;
    }

    sqlx::query(
        "UPDATE groups \
         SET words_count = (SELECT COUNT(*) FROM word_groups WHERE group_id = ?) \
         WHERE id = ?",
    )
    .bind(group_id)
    .bind(group_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(group = group_name, words = words.len(), "seeded word group");
    Ok(group_id)
}

pub async fn import_study_activities(
    pool: &SqlitePool,
    activities: &[SeedActivity],
) -> Result<(), SeedError> {
    let mut tx = pool.begin().await?;

    for activity in activities {
        sqlx::query("INSERT INTO study_activities (name, url, preview_url) VALUES (?, ?, ?)")
            .bind(&activity.name)
            .bind(&activity.url)
            .bind(&activity.preview_url)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    tracing::info!(count = activities.len(), "seeded study activities");
    Ok(())
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, SeedError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| SeedError::Io(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&raw).map_err(|e| SeedError::Parse(format!("{}: {e}", path.display())))
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("invalid seed file: {0}")]
    Parse(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}
