use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ligue1_ledger::LedgerError;
use serde_json::json;
use thiserror::Error;

use crate::mirror::MirrorError;

/// Failure of a single API request, rendered as `{ "error": message }`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid address")]
    InvalidAddress,

    #[error("Invalid request body: {0}")]
    BadRequest(String),

    #[error("Sandbox routes are disabled")]
    SandboxDisabled,

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Statistics unavailable: {0}")]
    Mirror(#[from] MirrorError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidAddress | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::SandboxDisabled => StatusCode::NOT_FOUND,
            ApiError::Ledger(error) => match error {
                LedgerError::InvalidAddress(_) | LedgerError::InvalidClub => {
                    StatusCode::BAD_REQUEST
                }
                LedgerError::AlreadyVoted => StatusCode::CONFLICT,
                LedgerError::NotVoted => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Mirror(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Failure to bring the gateway up.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Mirror error: {0}")]
    Mirror(#[from] MirrorError),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}
