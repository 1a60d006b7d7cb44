//! Token payload
//!
//! The claims carried by every token. Serialized with the registered JWT claim
//! names so standard tooling can read them.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use super::TokenError;

/// Claims of one token. Never mutated after creation.
///
/// Timestamps have whole-second precision, matching the `iat` / `exp`
/// encoding, so a payload compares equal to its decoded copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(rename = "jti")]
    pub id: Uuid,

    #[serde(rename = "sub")]
    pub username: String,

    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expired_at: DateTime<Utc>,
}

impl Payload {
    /// New payload issued now.
    pub fn new(username: &str, duration: Duration) -> Result<Self, TokenError> {
        Self::issued_at(username, duration, Utc::now())
    }

    /// New payload issued at `now`, valid for `duration`.
    ///
    /// Both timestamps are rounded up to the whole second, so the token is
    /// never shorter-lived than `duration` measured from `now`, and
    /// `expired_at - issued_at` is exactly the whole seconds of `duration`.
    pub fn issued_at(username: &str, duration: Duration, now: DateTime<Utc>) -> Result<Self, TokenError> {
        let issued_at = ceil_to_second(now).ok_or(TokenError::InvalidDuration)?;
        let seconds = i64::try_from(duration.as_secs()).map_err(|_| TokenError::InvalidDuration)?;
        let lifetime = chrono::Duration::try_seconds(seconds).ok_or(TokenError::InvalidDuration)?;
        let expired_at = issued_at
            .checked_add_signed(lifetime)
            .ok_or(TokenError::InvalidDuration)?;

        Ok(Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            issued_at,
            expired_at,
        })
    }

    /// Whether the payload has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expired_at
    }
}

fn ceil_to_second(t: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let floor = t.trunc_subsecs(0);
    if floor == t {
        Some(floor)
    } else {
        floor.checked_add_signed(chrono::Duration::seconds(1))
    }
}
