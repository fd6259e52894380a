use super::Repository;
use crate::domain::{PlayerId, UserId};
use crate::roster::{RosterError, RosterService};
use async_trait::async_trait;
use sqlx::Row;

fn backend(err: sqlx::Error) -> RosterError {
    RosterError::Backend(err.to_string())
}

impl Repository {
    /// Replace the user's registered XI. Order is the batting order.
    pub async fn save_playing_xi(&self, user: &UserId, xi: &[PlayerId]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM playing_xi WHERE user_id = ?")
            .bind(user.as_str())
            .execute(&mut *tx)
            .await?;
        for (slot, player) in xi.iter().enumerate() {
            sqlx::query("INSERT INTO playing_xi (user_id, slot, player_id) VALUES (?, ?, ?)")
                .bind(user.as_str())
                .bind(slot as i64)
                .bind(player.as_str())
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        tracing::info!(user = %user, players = xi.len(), "playing XI saved");
        Ok(())
    }

    pub async fn set_team_name(&self, user: &UserId, name: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO teams (user_id, team_name) VALUES (?, ?)
            ON CONFLICT(user_id) DO UPDATE SET team_name = excluded.team_name
            "#,
        )
        .bind(user.as_str())
        .bind(name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl RosterService for Repository {
    async fn playing_xi(&self, user: &UserId) -> Result<Option<Vec<PlayerId>>, RosterError> {
        let rows = sqlx::query("SELECT player_id FROM playing_xi WHERE user_id = ? ORDER BY slot")
            .bind(user.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(
            rows.iter()
                .map(|r| PlayerId::new(r.get::<String, _>("player_id")))
                .collect(),
        ))
    }

    async fn team_name(&self, user: &UserId) -> Result<Option<String>, RosterError> {
        let row = sqlx::query("SELECT team_name FROM teams WHERE user_id = ?")
            .bind(user.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        Ok(row.map(|r| r.get("team_name")))
    }
}
