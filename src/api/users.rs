use super::AppState;
use crate::domain::{Coins, UserId};
use crate::error::AppError;
use crate::ledger::JournalEntry;
use crate::records::{MatchRecord, UserRecord};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

impl LimitQuery {
    fn resolve(&self) -> Result<usize, AppError> {
        match self.limit {
            None => Ok(DEFAULT_LIMIT),
            Some(0) => Err(AppError::BadRequest("limit must be positive".to_string())),
            Some(n) => Ok(n.min(MAX_LIMIT)),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub user: UserId,
    pub balance: Coins,
    pub recent: Vec<JournalEntry>,
}

pub async fn get_balance(
    Path(id): Path<String>,
    Query(params): Query<LimitQuery>,
    State(state): State<AppState>,
) -> Result<Json<BalanceResponse>, AppError> {
    let user = UserId::new(id);
    let limit = params.resolve()?;
    let balance = state.ledger.balance(&user).await?;
    let recent = state.ledger.journal(&user, limit).await?;
    Ok(Json(BalanceResponse {
        user,
        balance,
        recent,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub user: UserId,
    pub record: UserRecord,
    pub matches: Vec<MatchRecord>,
}

pub async fn get_matches(
    Path(id): Path<String>,
    Query(params): Query<LimitQuery>,
    State(state): State<AppState>,
) -> Result<Json<HistoryResponse>, AppError> {
    let user = UserId::new(id);
    let limit = params.resolve()?;
    let record = state.records.user_record(&user).await?;
    let matches = state.records.history(&user, limit).await?;
    Ok(Json(HistoryResponse {
        user,
        record,
        matches,
    }))
}
