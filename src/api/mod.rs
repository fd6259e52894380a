//! HTTP command surface: match creation, actor responses, cancellation, the
//! per-match event feed, and wallet/history queries.

pub mod health;
pub mod matches;
pub mod users;

use crate::ledger::Ledger;
use crate::orchestration::MatchRegistry;
use crate::records::MatchRecordStore;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub registry: MatchRegistry,
    pub ledger: Arc<dyn Ledger>,
    pub records: Arc<dyn MatchRecordStore>,
}

impl AppState {
    pub fn new(
        registry: MatchRegistry,
        ledger: Arc<dyn Ledger>,
        records: Arc<dyn MatchRecordStore>,
    ) -> Self {
        Self {
            registry,
            ledger,
            records,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/matches", post(matches::create_match))
        .route("/v1/matches/:id", get(matches::get_match))
        .route("/v1/matches/:id/responses", post(matches::post_response))
        .route("/v1/matches/:id/cancel", post(matches::cancel_match))
        .route("/v1/matches/:id/events", get(matches::get_events))
        .route("/v1/users/:id/balance", get(users::get_balance))
        .route("/v1/users/:id/matches", get(users::get_matches))
        .layer(cors)
        .with_state(state)
}
