//! Token module
//!
//! Signed, expiring identity tokens. Verification is self-contained: it never
//! reaches storage, so forged or expired tokens fail before any I/O.

mod error;
mod jwt_maker;
mod payload;

pub use error::TokenError;
pub use jwt_maker::{JwtMaker, MIN_SECRET_KEY_SIZE};
pub use payload::Payload;

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Issues and verifies tokens.
pub trait Maker: Send + Sync {
    /// Create a token for `username` valid for `duration` from `now`.
    fn create_token_at(
        &self,
        username: &str,
        duration: Duration,
        now: DateTime<Utc>,
    ) -> Result<(String, Payload), TokenError>;

    /// Create a token for `username` valid for `duration`.
    fn create_token(&self, username: &str, duration: Duration) -> Result<(String, Payload), TokenError> {
        self.create_token_at(username, duration, Utc::now())
    }

    /// Verify `token` against an explicit clock instant.
    fn verify_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<Payload, TokenError>;

    /// Verify `token` against the current time.
    fn verify_token(&self, token: &str) -> Result<Payload, TokenError> {
        self.verify_token_at(token, Utc::now())
    }
}
