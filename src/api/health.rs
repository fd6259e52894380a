use super::AppState;
use axum::extract::State;
use axum::Json;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Ready once the router holds its registry; reports how many matches run.
pub async fn ready(State(state): State<AppState>) -> Json<serde_json::Value> {
    let active = state.registry.active_count().await;
    Json(serde_json::json!({"status": "ready", "activeMatches": active}))
}
