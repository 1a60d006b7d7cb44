//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    middleware,
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::OperationContext;
use crate::error::AppError;
use crate::handlers::{
    RenewAccessTokenCommand, RenewAccessTokenHandler, TransferCommand, TransferHandler,
};
use crate::store::TransferTxResult;

use super::middleware::auth_middleware;
use super::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct RenewAccessTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RenewAccessTokenResponse {
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
    pub currency: String,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
///
/// `/tokens/renew_access` is public; `/transfers` requires a bearer access
/// token.
pub fn create_router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/transfers", post(transfer))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/tokens/renew_access", post(renew_access_token))
        .merge(protected)
}

/// Turn body rejections (bad JSON, missing fields) into a 400
fn bind<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))
}

// =========================================================================
// POST /tokens/renew_access
// =========================================================================

/// Exchange a refresh token for a new access token
async fn renew_access_token(
    State(state): State<AppState>,
    body: Result<Json<RenewAccessTokenRequest>, JsonRejection>,
) -> Result<Json<RenewAccessTokenResponse>, AppError> {
    let request = bind(body)?;
    if request.refresh_token.is_empty() {
        return Err(AppError::InvalidRequest("refresh_token is required".to_string()));
    }

    let handler = RenewAccessTokenHandler::new(
        state.store.clone(),
        state.token_maker.clone(),
        state.access_token_duration,
    );

    let result = handler
        .execute(RenewAccessTokenCommand::new(request.refresh_token))
        .await?;

    Ok(Json(RenewAccessTokenResponse {
        access_token: result.access_token,
        access_token_expires_at: result.access_token_expires_at,
    }))
}

// =========================================================================
// POST /transfers
// =========================================================================

/// Transfer money between two accounts
async fn transfer(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    body: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<TransferTxResult>, AppError> {
    let request = bind(body)?;

    let handler = TransferHandler::new(state.store.clone(), state.transfer_timeout);

    let command = TransferCommand::new(
        request.from_account_id,
        request.to_account_id,
        request.amount,
        request.currency,
    );

    let result = handler.execute(command, &context).await?;

    Ok(Json(result))
}
