use super::AppState;
use crate::domain::{MatchId, UserId};
use crate::error::AppError;
use crate::interaction::{ActorResponse, SequencedEvent};
use crate::orchestration::{MatchOutcome, StartMatch};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedMatch {
    pub match_id: MatchId,
}

pub async fn create_match(
    State(state): State<AppState>,
    Json(request): Json<StartMatch>,
) -> Result<(StatusCode, Json<CreatedMatch>), AppError> {
    let channel = request.channel_id.clone();
    let match_id = state.registry.start(request).await?;
    tracing::info!(match_id = %match_id, channel = %channel, "match created");
    Ok((StatusCode::CREATED, Json(CreatedMatch { match_id })))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchStatus {
    pub match_id: MatchId,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<MatchOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub async fn get_match(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MatchStatus>, AppError> {
    let match_id = MatchId::new(id);
    let active = state.registry.is_active(&match_id).await;
    let outcome = state.registry.outcome(&match_id).await;
    if !active && outcome.is_none() {
        return Err(AppError::NotFound(format!("match {}", match_id)));
    }
    let message = outcome.as_ref().map(MatchOutcome::message);
    Ok(Json(MatchStatus {
        match_id,
        active,
        outcome,
        message,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ResponseBody {
    pub actor: UserId,
    pub choice: String,
}

pub async fn post_response(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<ResponseBody>,
) -> Result<StatusCode, AppError> {
    if body.choice.trim().is_empty() {
        return Err(AppError::BadRequest("choice must not be empty".to_string()));
    }
    let match_id = MatchId::new(id);
    state
        .registry
        .respond(
            &match_id,
            ActorResponse::new(body.actor, body.choice.trim().to_lowercase()),
        )
        .await?;
    Ok(StatusCode::ACCEPTED)
}

#[derive(Debug, Deserialize)]
pub struct CancelBody {
    pub requester: UserId,
}

pub async fn cancel_match(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<CancelBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let match_id = MatchId::new(id);
    state.registry.cancel(&match_id, &body.requester).await?;
    Ok(Json(serde_json::json!({
        "matchId": match_id,
        "status": "cancelling",
    })))
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub since: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsResponse {
    pub match_id: MatchId,
    pub events: Vec<SequencedEvent>,
    /// Pass back as `since` to resume the feed.
    pub next: u64,
    pub finished: bool,
}

pub async fn get_events(
    Path(id): Path<String>,
    Query(params): Query<EventsQuery>,
    State(state): State<AppState>,
) -> Result<Json<EventsResponse>, AppError> {
    let match_id = MatchId::new(id);
    let since = params.since.unwrap_or(0);
    let events = state
        .registry
        .events(&match_id, since)
        .await
        .ok_or_else(|| AppError::NotFound(format!("match {}", match_id)))?;
    let next = events.last().map(|e| e.seq + 1).unwrap_or(since);
    let finished = state.registry.outcome(&match_id).await.is_some();
    Ok(Json(EventsResponse {
        match_id,
        events,
        next,
        finished,
    }))
}
