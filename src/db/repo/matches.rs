use super::Repository;
use crate::domain::UserId;
use crate::records::{MatchRecord, MatchRecordStore, RecordId, RecordStoreError, UserRecord};
use async_trait::async_trait;
use chrono::SecondsFormat;
use sqlx::Row;

#[async_trait]
impl MatchRecordStore for Repository {
    async fn persist(&self, record: &MatchRecord) -> Result<RecordId, RecordStoreError> {
        let result = &record.result;
        let [first_user, second_user] = result.participants();
        let payload = serde_json::to_string(record)?;

        let mut tx = self.pool.begin().await?;
        let inserted = sqlx::query(
            r#"
            INSERT INTO match_records (
                match_id, first_user, second_user, winner, margin, venue,
                overs, format, difficulty, payload, finished_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(match_id) DO NOTHING
            "#,
        )
        .bind(result.match_id.as_str())
        .bind(first_user.as_str())
        .bind(second_user.as_str())
        .bind(result.winner.as_ref().map(|w| w.as_str()))
        .bind(result.margin.description())
        .bind(record.venue.as_str())
        .bind(record.overs as i64)
        .bind(record.format.as_str())
        .bind(record.difficulty.as_str())
        .bind(payload.as_str())
        .bind(record.finished_at.to_rfc3339_opts(SecondsFormat::Millis, true))
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() > 0 {
            for user in result.participants() {
                let mut delta = UserRecord::default();
                delta.apply(result, user);
                sqlx::query(
                    r#"
                    INSERT INTO user_records (user_id, matches, wins, losses, ties)
                    VALUES (?, ?, ?, ?, ?)
                    ON CONFLICT(user_id) DO UPDATE SET
                        matches = matches + excluded.matches,
                        wins = wins + excluded.wins,
                        losses = losses + excluded.losses,
                        ties = ties + excluded.ties
                    "#,
                )
                .bind(user.as_str())
                .bind(delta.matches as i64)
                .bind(delta.wins as i64)
                .bind(delta.losses as i64)
                .bind(delta.ties as i64)
                .execute(&mut *tx)
                .await?;
            }
            tracing::info!(match_id = %result.match_id, "match record stored");
        } else {
            tracing::debug!(match_id = %result.match_id, "match record already stored");
        }

        let row = sqlx::query("SELECT id FROM match_records WHERE match_id = ?")
            .bind(result.match_id.as_str())
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(RecordId(row.get("id")))
    }

    async fn history(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<MatchRecord>, RecordStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT match_id, payload FROM match_records
            WHERE first_user = ? OR second_user = ?
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(user.as_str())
        .bind(user.as_str())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let match_id: String = row.get("match_id");
                let payload: String = row.get("payload");
                serde_json::from_str(&payload)
                    .map_err(|e| RecordStoreError::Corrupt(format!("{}: {}", match_id, e)))
            })
            .collect()
    }

    async fn user_record(&self, user: &UserId) -> Result<UserRecord, RecordStoreError> {
        let row = sqlx::query(
            "SELECT matches, wins, losses, ties FROM user_records WHERE user_id = ?",
        )
        .bind(user.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row
            .map(|r| UserRecord {
                matches: r.get::<i64, _>("matches") as u32,
                wins: r.get::<i64, _>("wins") as u32,
                losses: r.get::<i64, _>("losses") as u32,
                ties: r.get::<i64, _>("ties") as u32,
            })
            .unwrap_or_default())
    }
}
