//! Ledger records
//!
//! Rows of the `accounts`, `entries` and `transfers` tables.
//! Amounts are integers in minor currency units (cents).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A customer account.
///
/// `balance` only ever changes inside the transfer transaction, through a
/// relative increment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub owner: String,
    pub balance: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// One signed balance movement for one account.
///
/// Debits are negative, credits positive. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Entry {
    pub id: i64,
    pub account_id: i64,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

impl Entry {
    pub fn is_debit(&self) -> bool {
        self.amount < 0
    }

    pub fn is_credit(&self) -> bool {
        self.amount > 0
    }
}

/// Record of money moved from one account to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Transfer {
    pub id: i64,
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_direction() {
        let debit = Entry {
            id: 1,
            account_id: 7,
            amount: -250,
            created_at: Utc::now(),
        };
        let credit = Entry {
            amount: 250,
            ..debit.clone()
        };

        assert!(debit.is_debit());
        assert!(!debit.is_credit());
        assert!(credit.is_credit());
        assert_eq!(debit.amount + credit.amount, 0);
    }

    #[test]
    fn test_account_serializes_balance_as_integer() {
        let account = Account {
            id: 3,
            owner: "alice".to_string(),
            balance: 10_050,
            currency: "USD".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["balance"], 10_050);
        assert_eq!(json["currency"], "USD");
    }
}
