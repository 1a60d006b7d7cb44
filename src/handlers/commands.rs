//! Command definitions
//!
//! Commands represent intentions to change the system state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =========================================================================
// TransferCommand
// =========================================================================

/// Command to move money between two accounts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferCommand {
    pub from_account_id: i64,
    pub to_account_id: i64,
    /// Amount in minor currency units
    pub amount: i64,
    /// Currency both accounts must hold
    pub currency: String,
}

impl TransferCommand {
    pub fn new(from_account_id: i64, to_account_id: i64, amount: i64, currency: impl Into<String>) -> Self {
        Self {
            from_account_id,
            to_account_id,
            amount,
            currency: currency.into(),
        }
    }
}

// =========================================================================
// RenewAccessTokenCommand
// =========================================================================

/// Command to exchange a refresh token for a new access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenewAccessTokenCommand {
    pub refresh_token: String,
}

impl RenewAccessTokenCommand {
    pub fn new(refresh_token: impl Into<String>) -> Self {
        Self {
            refresh_token: refresh_token.into(),
        }
    }
}

/// Result of a successful renewal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenewAccessTokenResult {
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
}
