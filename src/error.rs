//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::handlers::RenewalError;
use crate::store::{StoreError, TxError};
use crate::token::TokenError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Cannot transfer to the same account")]
    SameAccountTransfer,

    #[error("Account {account_id} holds {account_currency}, not {requested}")]
    CurrencyMismatch {
        account_id: i64,
        account_currency: String,
        requested: String,
    },

    #[error("Missing bearer access token")]
    MissingAccessToken,

    #[error("Invalid access token: {0}")]
    InvalidAccessToken(#[source] TokenError),

    #[error("Unauthorized transfer: account does not belong to the authenticated user")]
    UnauthorizedTransfer,

    #[error("Account not found: {0}")]
    AccountNotFound(i64),

    #[error(transparent)]
    Renewal(#[from] RenewalError),

    // Server errors (5xx)
    #[error(transparent)]
    Transaction(#[from] TxError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    /// Status, machine-readable code and optional details for the response
    fn classify(&self) -> (StatusCode, &'static str, Option<String>) {
        match self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }
            AppError::SameAccountTransfer => {
                (StatusCode::BAD_REQUEST, "same_account_transfer", None)
            }
            AppError::CurrencyMismatch { .. } => {
                (StatusCode::BAD_REQUEST, "currency_mismatch", Some(self.to_string()))
            }

            // 401 Unauthorized
            AppError::MissingAccessToken => {
                (StatusCode::UNAUTHORIZED, "missing_access_token", None)
            }
            AppError::InvalidAccessToken(TokenError::Expired) => {
                (StatusCode::UNAUTHORIZED, "expired_access_token", None)
            }
            AppError::InvalidAccessToken(_) => {
                (StatusCode::UNAUTHORIZED, "invalid_access_token", None)
            }
            AppError::UnauthorizedTransfer => {
                (StatusCode::UNAUTHORIZED, "unauthorized_transfer", None)
            }

            // 404 Not Found
            AppError::AccountNotFound(id) => {
                (StatusCode::NOT_FOUND, "account_not_found", Some(id.to_string()))
            }

            AppError::Renewal(err) => match err {
                RenewalError::TokenInvalid => (StatusCode::NOT_FOUND, "invalid_refresh_token", None),
                RenewalError::SessionNotFound => (StatusCode::NOT_FOUND, "session_not_found", None),
                RenewalError::TokenExpired => (StatusCode::UNAUTHORIZED, "expired_refresh_token", None),
                RenewalError::SessionBlocked => (StatusCode::UNAUTHORIZED, "blocked_session", None),
                RenewalError::SessionUserMismatch => {
                    (StatusCode::UNAUTHORIZED, "incorrect_session_user", None)
                }
                RenewalError::SessionTokenMismatch => {
                    (StatusCode::UNAUTHORIZED, "mismatched_session", None)
                }
                RenewalError::SessionExpired => (StatusCode::UNAUTHORIZED, "expired_session", None),
                RenewalError::Store(e) => {
                    tracing::error!("Session lookup failed: {:?}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
                }
                RenewalError::TokenCreation(e) => {
                    tracing::error!("Access token creation failed: {:?}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "token_error", None)
                }
            },

            // 503 when the client may try again, 500 otherwise
            AppError::Transaction(e) => {
                tracing::error!("Transfer transaction failed: {}", e);
                if e.is_retryable() {
                    (StatusCode::SERVICE_UNAVAILABLE, "transaction_unavailable", None)
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "transaction_failed", None)
                }
            }

            // 500 Internal Server Error
            AppError::Store(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = self.classify();

        // Internal failure text stays in the logs
        let error = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            error,
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
