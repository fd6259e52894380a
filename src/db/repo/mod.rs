//! SQLite repository.
//!
//! One `Repository` backs every persistent seam of the service. The trait
//! implementations live in submodules by concern:
//! - `wallets.rs` - coin ledger (`Ledger`)
//! - `matches.rs` - match history and per-user records (`MatchRecordStore`)
//! - `rosters.rs` - registered XIs and team names (`RosterService`)

mod matches;
mod rosters;
mod wallets;

use sqlx::sqlite::SqlitePool;

/// Repository for database operations.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Liveness check used by the readiness endpoint.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Repository;
    use crate::db::init_db;
    use tempfile::TempDir;

    pub async fn repo() -> (TempDir, Repository) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("arena.db").to_string_lossy().to_string();
        let pool = init_db(&path).await.expect("init_db failed");
        (dir, Repository::new(pool))
    }
}
