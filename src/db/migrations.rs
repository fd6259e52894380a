//! Schema setup and connection configuration.

use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::info;

const SCHEMA: &str = include_str!("schema.sql");

/// Open (creating if needed) the SQLite file at `db_path` and apply the schema.
pub async fn init_db(db_path: &str) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).ok();
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .after_connect(|conn, _meta| Box::pin(async move { configure_pragmas(conn).await }))
        .connect(&format!("sqlite:{}?mode=rwc", db_path))
        .await?;

    apply_schema(&pool).await?;

    info!(path = %db_path, "database ready");
    Ok(pool)
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut applied = 0usize;
    for statement in SCHEMA.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
            applied += 1;
        }
    }
    info!(statements = applied, "schema applied");
    Ok(())
}

async fn configure_pragmas(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    use sqlx::Row;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&mut *conn)
        .await?;

    // journal_mode reports the mode actually chosen
    let row = sqlx::query("PRAGMA journal_mode = WAL")
        .fetch_one(&mut *conn)
        .await?;
    let journal_mode: String = row.get(0);
    tracing::debug!(journal_mode = %journal_mode, "sqlite journal mode");

    // Wallet updates from concurrent match tasks wait instead of failing.
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&mut *conn)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&mut *conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn fresh() -> (TempDir, SqlitePool) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("arena.db").to_string_lossy().to_string();
        let pool = init_db(&path).await.expect("init_db failed");
        (dir, pool)
    }

    #[tokio::test]
    async fn test_creates_wallet_and_record_tables() {
        let (_dir, pool) = fresh().await;
        for table in [
            "wallets",
            "ledger_entries",
            "match_records",
            "user_records",
            "teams",
            "playing_xi",
        ] {
            let found: (String,) =
                sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name = ?")
                    .bind(table)
                    .fetch_one(&pool)
                    .await
                    .unwrap_or_else(|e| panic!("missing table {}: {}", table, e));
            assert_eq!(found.0, table);
        }
    }

    #[tokio::test]
    async fn test_schema_reapplies_cleanly() {
        let (_dir, pool) = fresh().await;
        apply_schema(&pool).await.expect("second schema run failed");
    }

    #[tokio::test]
    async fn test_pragmas_configured() {
        let (_dir, pool) = fresh().await;
        let result: (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(result.0, 1);

        let result: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(matches!(result.0.as_str(), "wal" | "delete"));
    }

    #[tokio::test]
    async fn test_negative_balance_rejected_by_schema() {
        let (_dir, pool) = fresh().await;
        let err = sqlx::query(
            "INSERT INTO wallets (user_id, balance, created_at, updated_at) VALUES ('u', -1, 0, 0)",
        )
        .execute(&pool)
        .await;
        assert!(err.is_err());
    }
}
