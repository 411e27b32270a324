use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;
use uuid::Uuid;

use crate::models::contracts::Status;

/// Everything a contract operation can fail with.
///
/// Each variant maps to exactly one HTTP status in [`ResponseError`], so
/// handlers can return `Result<HttpResponse, ContractError>` and let `?` do
/// the translation.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    /// Malformed or missing input.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The caller's role does not allow the requested action.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The action is not a legal transition from the current status.
    #[error("Cannot {action} a contract that is {status}")]
    InvalidState { status: Status, action: &'static str },

    #[error("Contract {0} not found")]
    NotFound(Uuid),

    /// The stored version moved between read and write.
    #[error("Contract {0} was modified concurrently, re-fetch and try again")]
    ConcurrencyConflict(Uuid),

    #[error("Request exceeded its deadline")]
    Timeout,

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ContractResult<T> = Result<T, ContractError>;

impl ContractError {
    /// Stable machine-readable code included in every error body.
    pub fn code(&self) -> &'static str {
        match self {
            ContractError::Validation(_) => "VALIDATION_ERROR",
            ContractError::Forbidden(_) => "FORBIDDEN",
            ContractError::InvalidState { .. } => "INVALID_STATE",
            ContractError::NotFound(_) => "NOT_FOUND",
            ContractError::ConcurrencyConflict(_) => "CONCURRENCY_CONFLICT",
            ContractError::Timeout => "TIMEOUT",
            ContractError::Database(_) | ContractError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for ContractError {
    fn status_code(&self) -> StatusCode {
        match self {
            ContractError::Validation(_) => StatusCode::BAD_REQUEST,
            ContractError::Forbidden(_) => StatusCode::FORBIDDEN,
            ContractError::NotFound(_) => StatusCode::NOT_FOUND,
            ContractError::InvalidState { .. } | ContractError::ConcurrencyConflict(_) => {
                StatusCode::CONFLICT
            }
            ContractError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ContractError::Database(_) | ContractError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Never leak driver messages to the caller.
        let message = match self {
            ContractError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                "An internal error occurred".to_string()
            }
            ContractError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": message,
            "code": self.code(),
        }))
    }
}
