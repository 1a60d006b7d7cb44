//! Refresh-token sessions
//!
//! A session binds one refresh token to a user. Sessions are created at login
//! and blocked by operators; the renewal flow only reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Row of the `sessions` table.
///
/// `id` is the id embedded in the refresh token's payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub id: Uuid,
    pub username: String,
    pub refresh_token: String,
    pub user_agent: String,
    pub client_ip: String,
    pub is_blocked: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Whether the stored expiry has passed at `now`.
    ///
    /// Checked separately from the refresh token's own `exp` so an operator can
    /// end a session early by moving `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
