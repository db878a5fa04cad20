//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use cloudvault_core::error::{AppError, ErrorKind};
use cloudvault_entity::wire::ShareDeniedResponse;

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Error returned by `/api` handlers.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

/// Status code and error code for an error kind.
pub fn status_for(kind: ErrorKind) -> (StatusCode, &'static str) {
    match kind {
        ErrorKind::Validation | ErrorKind::Serialization => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
        }
        ErrorKind::Authentication => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        ErrorKind::Authorization => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        ErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT"),
        ErrorKind::Expired => (StatusCode::GONE, "SHARE_EXPIRED"),
        ErrorKind::LimitReached => (StatusCode::GONE, "DOWNLOAD_LIMIT_REACHED"),
        ErrorKind::Revoked => (StatusCode::GONE, "SHARE_REVOKED"),
        ErrorKind::Transfer | ErrorKind::Storage | ErrorKind::ExternalService => {
            (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR")
        }
        ErrorKind::Internal | ErrorKind::Database | ErrorKind::Configuration => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let (status, error_code) = status_for(err.kind);
        if status.is_server_error() {
            tracing::error!(kind = %err.kind, error = %err.message, "Request failed");
        }

        let body = ApiErrorResponse {
            error: error_code.to_string(),
            message: err.message,
        };
        (status, Json(body)).into_response()
    }
}

/// Error returned by the public share endpoints.
///
/// A share that can no longer be used answers 403 with its reason; every
/// other error maps like [`ApiError`].
#[derive(Debug)]
pub struct ShareError(pub AppError);

impl From<AppError> for ShareError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

fn denial_reason(kind: ErrorKind) -> Option<&'static str> {
    match kind {
        ErrorKind::Expired => Some("expired"),
        ErrorKind::LimitReached => Some("limit_reached"),
        ErrorKind::Revoked => Some("revoked"),
        _ => None,
    }
}

impl IntoResponse for ShareError {
    fn into_response(self) -> Response {
        match denial_reason(self.0.kind) {
            Some(reason) => {
                let body = ShareDeniedResponse {
                    reason: reason.to_string(),
                    message: self.0.message,
                };
                (StatusCode::FORBIDDEN, Json(body)).into_response()
            }
            None => ApiError(self.0).into_response(),
        }
    }
}
