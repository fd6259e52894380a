use crate::ledger::LedgerError;
use crate::orchestration::RegistryError;
use crate::records::RecordStoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidAmount(_) => AppError::BadRequest(err.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<RecordStoreError> for AppError {
    fn from(err: RecordStoreError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::ChannelBusy(_) => AppError::Conflict(err.to_string()),
            RegistryError::NotFound(_) => AppError::NotFound(err.to_string()),
            RegistryError::NotCreator => AppError::Forbidden(err.to_string()),
            RegistryError::Invalid(msg) => AppError::BadRequest(msg),
            RegistryError::Roster(e) => AppError::Internal(e.to_string()),
            RegistryError::Ledger(e) => e.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
        };

        if status.is_server_error() {
            tracing::error!(error = %error_message, "request failed");
        }

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChannelId, MatchId};

    #[test]
    fn test_registry_errors_map_to_statuses() {
        let cases = [
            (RegistryError::ChannelBusy(ChannelId::new("c1")), StatusCode::CONFLICT),
            (RegistryError::NotFound(MatchId::new("m1")), StatusCode::NOT_FOUND),
            (RegistryError::NotCreator, StatusCode::FORBIDDEN),
            (RegistryError::Invalid("overs".to_string()), StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }
}
