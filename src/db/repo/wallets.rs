use super::{now_ms, Repository};
use crate::domain::{Coins, UserId};
use crate::ledger::{check_amount, DebitReceipt, JournalEntry, Ledger, LedgerError, PostingKey};
use async_trait::async_trait;
use sqlx::{Row, Sqlite, Transaction};

#[async_trait]
impl Ledger for Repository {
    async fn ensure_account(&self, user: &UserId, opening: Coins) -> Result<Coins, LedgerError> {
        let now = now_ms();
        let inserted = sqlx::query(
            r#"
            INSERT INTO wallets (user_id, balance, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id) DO NOTHING
            "#,
        )
        .bind(user.as_str())
        .bind(opening.max(0))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        if inserted.rows_affected() > 0 {
            tracing::info!(user = %user, opening, "wallet opened");
        }
        self.balance(user).await
    }

    async fn balance(&self, user: &UserId) -> Result<Coins, LedgerError> {
        let row = sqlx::query("SELECT balance FROM wallets WHERE user_id = ?")
            .bind(user.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get::<i64, _>("balance")).unwrap_or(0))
    }

    async fn credit(
        &self,
        user: &UserId,
        amount: Coins,
        reason: &str,
    ) -> Result<Coins, LedgerError> {
        check_amount(amount)?;
        let now = now_ms();
        let mut tx = self.pool.begin().await?;
        let balance_after = add_to_wallet(&mut tx, user, amount, now).await?;
        insert_entry(&mut tx, user, amount, reason, balance_after, None, now).await?;
        tx.commit().await?;
        Ok(balance_after)
    }

    async fn debit(
        &self,
        user: &UserId,
        amount: Coins,
        reason: &str,
    ) -> Result<DebitReceipt, LedgerError> {
        check_amount(amount)?;
        let now = now_ms();
        let mut tx = self.pool.begin().await?;
        let receipt = take_from_wallet(&mut tx, user, amount, now).await?;
        if receipt.debited > 0 {
            insert_entry(
                &mut tx,
                user,
                -receipt.debited,
                reason,
                receipt.balance_after,
                None,
                now,
            )
            .await?;
        }
        tx.commit().await?;
        Ok(receipt)
    }

    async fn credit_once(
        &self,
        key: &PostingKey,
        user: &UserId,
        amount: Coins,
        reason: &str,
    ) -> Result<Option<Coins>, LedgerError> {
        check_amount(amount)?;
        let now = now_ms();
        let mut tx = self.pool.begin().await?;
        // The upsert takes the write lock before the key is checked.
        let balance_after = add_to_wallet(&mut tx, user, amount, now).await?;
        if is_posted(&mut tx, key).await? {
            tx.rollback().await?;
            tracing::debug!(user = %user, key = %key, "credit already posted");
            return Ok(None);
        }
        insert_entry(&mut tx, user, amount, reason, balance_after, Some(key), now).await?;
        tx.commit().await?;
        Ok(Some(balance_after))
    }

    async fn debit_once(
        &self,
        key: &PostingKey,
        user: &UserId,
        amount: Coins,
        reason: &str,
    ) -> Result<Option<DebitReceipt>, LedgerError> {
        check_amount(amount)?;
        let now = now_ms();
        let mut tx = self.pool.begin().await?;
        let receipt = take_from_wallet(&mut tx, user, amount, now).await?;
        if is_posted(&mut tx, key).await? {
            tx.rollback().await?;
            tracing::debug!(user = %user, key = %key, "debit already posted");
            return Ok(None);
        }
        let entry = insert_entry(
            &mut tx,
            user,
            -receipt.debited,
            reason,
            receipt.balance_after,
            Some(key),
            now,
        )
        .await;
        match entry {
            Ok(()) => {}
            // Without a wallet row there was no lock to serialize on.
            Err(e) if is_duplicate_posting(&e) => {
                tx.rollback().await?;
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }
        tx.commit().await?;
        Ok(Some(receipt))
    }

    async fn journal(&self, user: &UserId, limit: usize) -> Result<Vec<JournalEntry>, LedgerError> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, delta, reason, balance_after
            FROM ledger_entries
            WHERE user_id = ?
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(user.as_str())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| JournalEntry {
                user: UserId::new(row.get::<String, _>("user_id")),
                delta: row.get("delta"),
                reason: row.get("reason"),
                balance_after: row.get("balance_after"),
            })
            .collect())
    }
}

async fn add_to_wallet(
    tx: &mut Transaction<'_, Sqlite>,
    user: &UserId,
    amount: Coins,
    now: i64,
) -> Result<Coins, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO wallets (user_id, balance, created_at, updated_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            balance = balance + excluded.balance,
            updated_at = excluded.updated_at
        RETURNING balance
        "#,
    )
    .bind(user.as_str())
    .bind(amount)
    .bind(now)
    .bind(now)
    .fetch_one(&mut **tx)
    .await?;
    Ok(row.get("balance"))
}

/// Clamped debit inside `tx`. Touching the row first takes the write lock,
/// so the balance read cannot go stale before the update lands.
async fn take_from_wallet(
    tx: &mut Transaction<'_, Sqlite>,
    user: &UserId,
    amount: Coins,
    now: i64,
) -> Result<DebitReceipt, sqlx::Error> {
    let row = sqlx::query("UPDATE wallets SET updated_at = ? WHERE user_id = ? RETURNING balance")
        .bind(now)
        .bind(user.as_str())
        .fetch_optional(&mut **tx)
        .await?;
    let current: Coins = row.map(|r| r.get("balance")).unwrap_or(0);
    let debited = amount.min(current);
    if debited > 0 {
        sqlx::query("UPDATE wallets SET balance = balance - ? WHERE user_id = ?")
            .bind(debited)
            .bind(user.as_str())
            .execute(&mut **tx)
            .await?;
    }
    Ok(DebitReceipt {
        requested: amount,
        debited,
        balance_after: current - debited,
    })
}

async fn is_posted(
    tx: &mut Transaction<'_, Sqlite>,
    key: &PostingKey,
) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT 1 FROM ledger_entries WHERE posting_key = ?")
        .bind(key.as_str())
        .fetch_optional(&mut **tx)
        .await?;
    Ok(row.is_some())
}

fn is_duplicate_posting(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

async fn insert_entry(
    tx: &mut Transaction<'_, Sqlite>,
    user: &UserId,
    delta: Coins,
    reason: &str,
    balance_after: Coins,
    key: Option<&PostingKey>,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO ledger_entries (user_id, delta, reason, balance_after, posting_key, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user.as_str())
    .bind(delta)
    .bind(reason)
    .bind(balance_after)
    .bind(key.map(PostingKey::as_str))
    .bind(now)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
