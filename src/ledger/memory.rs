use super::{check_amount, DebitReceipt, JournalEntry, Ledger, LedgerError, PostingKey};
use crate::domain::{Coins, UserId};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Books {
    balances: HashMap<UserId, Coins>,
    journal: Vec<JournalEntry>,
    posted: HashSet<PostingKey>,
}

impl Books {
    fn credit(&mut self, user: &UserId, amount: Coins, reason: &str) -> Coins {
        let balance = self.balances.entry(user.clone()).or_insert(0);
        *balance += amount;
        let balance_after = *balance;
        self.journal.push(JournalEntry {
            user: user.clone(),
            delta: amount,
            reason: reason.to_string(),
            balance_after,
        });
        balance_after
    }

    fn debit(&mut self, user: &UserId, amount: Coins, reason: &str, always_journal: bool) -> DebitReceipt {
        let current = self.balances.get(user).copied().unwrap_or(0);
        let debited = amount.min(current);
        let balance_after = current - debited;
        if let Some(balance) = self.balances.get_mut(user) {
            *balance = balance_after;
        }
        if debited > 0 || always_journal {
            self.journal.push(JournalEntry {
                user: user.clone(),
                delta: -debited,
                reason: reason.to_string(),
                balance_after,
            });
        }
        DebitReceipt {
            requested: amount,
            debited,
            balance_after,
        }
    }
}

/// Process-local ledger. One lock covers balance and journal together.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    books: Mutex<Books>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_balances(balances: impl IntoIterator<Item = (UserId, Coins)>) -> Self {
        let ledger = Self::new();
        {
            let mut books = ledger.books.lock().await;
            books.balances.extend(balances);
        }
        ledger
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn ensure_account(&self, user: &UserId, opening: Coins) -> Result<Coins, LedgerError> {
        let mut books = self.books.lock().await;
        Ok(*books.balances.entry(user.clone()).or_insert(opening.max(0)))
    }

    async fn balance(&self, user: &UserId) -> Result<Coins, LedgerError> {
        let books = self.books.lock().await;
        Ok(books.balances.get(user).copied().unwrap_or(0))
    }

    async fn credit(
        &self,
        user: &UserId,
        amount: Coins,
        reason: &str,
    ) -> Result<Coins, LedgerError> {
        check_amount(amount)?;
        let mut books = self.books.lock().await;
        Ok(books.credit(user, amount, reason))
    }

    async fn debit(
        &self,
        user: &UserId,
        amount: Coins,
        reason: &str,
    ) -> Result<DebitReceipt, LedgerError> {
        check_amount(amount)?;
        let mut books = self.books.lock().await;
        Ok(books.debit(user, amount, reason, false))
    }

    async fn credit_once(
        &self,
        key: &PostingKey,
        user: &UserId,
        amount: Coins,
        reason: &str,
    ) -> Result<Option<Coins>, LedgerError> {
        check_amount(amount)?;
        let mut books = self.books.lock().await;
        if !books.posted.insert(key.clone()) {
            return Ok(None);
        }
        Ok(Some(books.credit(user, amount, reason)))
    }

    async fn debit_once(
        &self,
        key: &PostingKey,
        user: &UserId,
        amount: Coins,
        reason: &str,
    ) -> Result<Option<DebitReceipt>, LedgerError> {
        check_amount(amount)?;
        let mut books = self.books.lock().await;
        if !books.posted.insert(key.clone()) {
            return Ok(None);
        }
        Ok(Some(books.debit(user, amount, reason, true)))
    }

    async fn journal(&self, user: &UserId, limit: usize) -> Result<Vec<JournalEntry>, LedgerError> {
        let books = self.books.lock().await;
        Ok(books
            .journal
            .iter()
            .rev()
            .filter(|e| e.user == *user)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_debit_clamps_to_balance() {
        let user = UserId::new("u1");
        let ledger = InMemoryLedger::with_balances([(user.clone(), 300)]).await;
        let receipt = ledger.debit(&user, 500, "forfeit penalty").await.unwrap();
        assert_eq!(receipt.debited, 300);
        assert_eq!(receipt.balance_after, 0);
        assert!(!receipt.is_full());
        assert_eq!(ledger.balance(&user).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_credit_and_journal() {
        let user = UserId::new("u1");
        let ledger = InMemoryLedger::new();
        assert_eq!(ledger.ensure_account(&user, 1000).await.unwrap(), 1000);
        assert_eq!(ledger.ensure_account(&user, 5).await.unwrap(), 1000);
        ledger.credit(&user, 5000, "match win").await.unwrap();
        let receipt = ledger.debit(&user, 500, "forfeit penalty").await.unwrap();
        assert!(receipt.is_full());

        let journal = ledger.journal(&user, 10).await.unwrap();
        assert_eq!(journal.len(), 2);
        assert_eq!(journal[0].delta, -500);
        assert_eq!(journal[1].reason, "match win");
        assert_eq!(ledger.balance(&user).await.unwrap(), 5500);
    }

    #[tokio::test]
    async fn test_rejects_non_positive_amounts() {
        let ledger = InMemoryLedger::new();
        let user = UserId::new("u1");
        assert!(matches!(
            ledger.credit(&user, 0, "x").await,
            Err(LedgerError::InvalidAmount(0))
        ));
        assert!(ledger.debit(&user, -5, "x").await.is_err());
    }

    #[tokio::test]
    async fn test_keyed_postings_apply_once() {
        let user = UserId::new("u1");
        let ledger = InMemoryLedger::with_balances([(user.clone(), 200)]).await;
        let win = PostingKey::new("m1:u1:match win");
        let penalty = PostingKey::new("m2:u1:forfeit penalty");

        assert_eq!(ledger.credit_once(&win, &user, 5000, "match win").await.unwrap(), Some(5200));
        assert_eq!(ledger.credit_once(&win, &user, 5000, "match win").await.unwrap(), None);

        let receipt = ledger.debit_once(&penalty, &user, 500, "forfeit penalty").await.unwrap();
        assert_eq!(receipt.map(|r| r.debited), Some(500));
        assert!(ledger.debit_once(&penalty, &user, 500, "forfeit penalty").await.unwrap().is_none());
        assert_eq!(ledger.balance(&user).await.unwrap(), 4700);
    }

    #[tokio::test]
    async fn test_keyed_debit_on_empty_wallet_still_consumes_key() {
        let user = UserId::new("u1");
        let ledger = InMemoryLedger::new();
        let key = PostingKey::new("m1:u1:forfeit penalty");

        let receipt = ledger.debit_once(&key, &user, 500, "forfeit penalty").await.unwrap().unwrap();
        assert_eq!(receipt.debited, 0);
        ledger.credit(&user, 1000, "top up").await.unwrap();
        assert!(ledger.debit_once(&key, &user, 500, "forfeit penalty").await.unwrap().is_none());
        assert_eq!(ledger.balance(&user).await.unwrap(), 1000);
    }
}
