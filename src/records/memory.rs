use super::{MatchRecord, MatchRecordStore, RecordId, RecordStoreError, UserRecord};
use crate::domain::{MatchId, UserId};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Tables {
    records: Vec<MatchRecord>,
    ids: HashMap<MatchId, RecordId>,
    users: HashMap<UserId, UserRecord>,
}

#[derive(Debug, Default)]
pub struct InMemoryRecords {
    tables: Mutex<Tables>,
}

impl InMemoryRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tables.lock().await.records.len()
    }
}

#[async_trait]
impl MatchRecordStore for InMemoryRecords {
    async fn persist(&self, record: &MatchRecord) -> Result<RecordId, RecordStoreError> {
        let mut tables = self.tables.lock().await;
        if let Some(id) = tables.ids.get(record.match_id()) {
            return Ok(*id);
        }
        let id = RecordId(tables.records.len() as i64 + 1);
        tables.ids.insert(record.match_id().clone(), id);
        for user in record.result.participants() {
            tables
                .users
                .entry(user.clone())
                .or_default()
                .apply(&record.result, user);
        }
        tables.records.push(record.clone());
        Ok(id)
    }

    async fn history(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<MatchRecord>, RecordStoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .records
            .iter()
            .rev()
            .filter(|r| r.involves(user))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn user_record(&self, user: &UserId) -> Result<UserRecord, RecordStoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.get(user).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Difficulty, InningsScore, MatchFormat, MatchResult};
    use chrono::Utc;

    fn record(id: &str) -> MatchRecord {
        let result = MatchResult::decide(
            MatchId::new(id),
            InningsScore {
                batting_user: UserId::new("alice"),
                runs: 40,
                wickets: 3,
                balls: 30,
            },
            InningsScore {
                batting_user: UserId::new("bob"),
                runs: 30,
                wickets: 10,
                balls: 25,
            },
        );
        MatchRecord {
            result,
            venue: "MCG, Melbourne".to_string(),
            overs: 5,
            format: MatchFormat::T10,
            difficulty: Difficulty::Easy,
            finished_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_persist_is_idempotent_per_match() {
        let store = InMemoryRecords::new();
        let first = store.persist(&record("m1")).await.unwrap();
        let again = store.persist(&record("m1")).await.unwrap();
        assert_eq!(first, again);
        assert_eq!(store.len().await, 1);

        let alice = store.user_record(&UserId::new("alice")).await.unwrap();
        assert_eq!(alice.wins, 1);
        assert_eq!(alice.matches, 1);
        let bob = store.user_record(&UserId::new("bob")).await.unwrap();
        assert_eq!(bob.losses, 1);
    }

    #[tokio::test]
    async fn test_history_newest_first() {
        let store = InMemoryRecords::new();
        store.persist(&record("m1")).await.unwrap();
        store.persist(&record("m2")).await.unwrap();
        let history = store.history(&UserId::new("bob"), 10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].match_id(), &MatchId::new("m2"));
        assert!(store.history(&UserId::new("carol"), 10).await.unwrap().is_empty());
    }
}
