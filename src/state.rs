use std::time::Instant;

use sqlx::SqlitePool;

/// Shared handler state. The pool is the only resource this service
/// owns; handlers check connections out per query and the pool returns
/// them on every exit path.
#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    pool: SqlitePool,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            started_at: Instant::now(),
            pool,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
