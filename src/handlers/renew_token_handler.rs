//! Renew Access Token Handler
//!
//! Exchanges a valid, non-revoked refresh token for a new access token.
//! Read-only: sessions are never modified here.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::store::{SessionStore, StoreError};
use crate::token::{Maker, TokenError};

use super::{RenewAccessTokenCommand, RenewAccessTokenResult};

/// Reasons a renewal is refused
#[derive(Debug, thiserror::Error)]
pub enum RenewalError {
    #[error("Refresh token is invalid")]
    TokenInvalid,

    #[error("Refresh token has expired")]
    TokenExpired,

    #[error("Session not found")]
    SessionNotFound,

    #[error("Blocked session")]
    SessionBlocked,

    #[error("Incorrect session user")]
    SessionUserMismatch,

    #[error("Mismatched session token")]
    SessionTokenMismatch,

    #[error("Expired session")]
    SessionExpired,

    #[error("Session lookup failed: {0}")]
    Store(#[source] StoreError),

    #[error("Failed to issue access token: {0}")]
    TokenCreation(#[source] TokenError),
}

impl RenewalError {
    /// Check if this is a refusal based on the session record
    pub fn is_session_error(&self) -> bool {
        matches!(
            self,
            RenewalError::SessionNotFound
                | RenewalError::SessionBlocked
                | RenewalError::SessionUserMismatch
                | RenewalError::SessionTokenMismatch
                | RenewalError::SessionExpired
        )
    }
}

/// Handler for access token renewal
///
/// Generic over the session source so both a concrete store and a
/// `dyn Store` can back it.
pub struct RenewAccessTokenHandler<S: ?Sized> {
    sessions: Arc<S>,
    token_maker: Arc<dyn Maker>,
    access_token_duration: Duration,
}

impl<S: SessionStore + ?Sized> RenewAccessTokenHandler<S> {
    pub fn new(sessions: Arc<S>, token_maker: Arc<dyn Maker>, access_token_duration: Duration) -> Self {
        Self {
            sessions,
            token_maker,
            access_token_duration,
        }
    }

    /// Execute the renewal against the current time
    pub async fn execute(&self, command: RenewAccessTokenCommand) -> Result<RenewAccessTokenResult, RenewalError> {
        self.execute_at(command, Utc::now()).await
    }

    /// Execute the renewal, checking expiries against `now`.
    ///
    /// Each check short-circuits; no token is issued unless all pass.
    pub async fn execute_at(
        &self,
        command: RenewAccessTokenCommand,
        now: DateTime<Utc>,
    ) -> Result<RenewAccessTokenResult, RenewalError> {
        // Forged or expired tokens are rejected here without touching storage.
        let refresh_payload = self
            .token_maker
            .verify_token_at(&command.refresh_token, now)
            .map_err(|e| match e {
                TokenError::Expired => RenewalError::TokenExpired,
                _ => RenewalError::TokenInvalid,
            })?;

        let session = self
            .sessions
            .get_session(refresh_payload.id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => RenewalError::SessionNotFound,
                other => RenewalError::Store(other),
            })?;

        if session.is_blocked {
            return Err(RenewalError::SessionBlocked);
        }

        if session.username != refresh_payload.username {
            return Err(RenewalError::SessionUserMismatch);
        }

        if session.refresh_token != command.refresh_token {
            return Err(RenewalError::SessionTokenMismatch);
        }

        // Independent of the token's own exp: operators may end a session early.
        if session.is_expired_at(now) {
            return Err(RenewalError::SessionExpired);
        }

        let (access_token, access_payload) = self
            .token_maker
            .create_token(&refresh_payload.username, self.access_token_duration)
            .map_err(RenewalError::TokenCreation)?;

        tracing::info!(
            username = %refresh_payload.username,
            session_id = %session.id,
            "Access token renewed"
        );

        Ok(RenewAccessTokenResult {
            access_token,
            access_token_expires_at: access_payload.expired_at,
        })
    }
}
