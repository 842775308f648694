use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use ledgerly_core::{DomainError, ValidationError};
use ledgerly_infra::StoreError;

/// Everything a handler can fail with, mapped to one JSON error shape.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Body or query string could not be read into the expected shape.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown username or wrong password; deliberately not distinguished.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found")]
    NotFound,

    /// Infrastructure failure. The detail is logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for ApiError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(v) => ApiError::Validation(v),
            DomainError::NotFound => ApiError::NotFound,
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Validation(v) => ApiError::Validation(v),
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::NotFound => ApiError::NotFound,
            e @ (StoreError::Unavailable(_) | StoreError::Backend(_)) => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(v) => json_error(StatusCode::BAD_REQUEST, v.code(), v.to_string()),
            ApiError::InvalidRequest(msg) => {
                json_error(StatusCode::BAD_REQUEST, "invalid_request", msg)
            }
            ApiError::InvalidCredentials => json_error(
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "Invalid username or password",
            ),
            ApiError::Conflict(msg) => {
                tracing::debug!(%msg, "conflict");
                json_error(StatusCode::CONFLICT, "conflict", "Username already exists")
            }
            ApiError::NotFound => {
                json_error(StatusCode::NOT_FOUND, "not_found", "Transaction not found")
            }
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "request failed");
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                )
            }
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_statuses() {
        let status = |e: StoreError| ApiError::from(e).into_response().status();
        assert_eq!(status(StoreError::Conflict("dup".into())), StatusCode::CONFLICT);
        assert_eq!(status(StoreError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status(StoreError::Validation(ValidationError::MissingFields(vec!["username"]))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(StoreError::Unavailable("pool timed out".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(StoreError::Backend("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn credentials_failure_is_unauthorized() {
        assert_eq!(
            ApiError::InvalidCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
