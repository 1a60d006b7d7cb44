//! Store Errors
//!
//! Error types for reads and for the transfer transaction.

use std::fmt;

/// Errors from single-statement store reads and writes
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No row matched
    #[error("Record not found")]
    NotFound,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Database(other),
        }
    }
}

/// Step of the transfer transaction, for error context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStep {
    CreateTransfer,
    CreateEntry { account_id: i64 },
    AddAccountBalance { account_id: i64 },
}

impl fmt::Display for TxStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxStep::CreateTransfer => write!(f, "create transfer"),
            TxStep::CreateEntry { account_id } => write!(f, "create entry for account {}", account_id),
            TxStep::AddAccountBalance { account_id } => {
                write!(f, "add balance to account {}", account_id)
            }
        }
    }
}

/// A failed statement inside a unit of work
#[derive(Debug, thiserror::Error)]
#[error("{step} failed: {source}")]
pub struct StepError {
    pub step: TxStep,
    #[source]
    pub source: sqlx::Error,
}

impl StepError {
    pub fn new(step: TxStep, source: sqlx::Error) -> Self {
        Self { step, source }
    }
}

/// Errors from the transfer transaction
///
/// `Aborted` means the writes were rolled back cleanly; `RollbackFailed`
/// means the abort itself failed and both causes are kept.
#[derive(Debug, thiserror::Error)]
pub enum TxError {
    #[error("Failed to begin transaction: {0}")]
    Begin(#[source] sqlx::Error),

    #[error("Transaction aborted: {0}")]
    Aborted(#[source] StepError),

    #[error("Transaction aborted: {source}; rollback failed: {rollback}")]
    RollbackFailed {
        #[source]
        source: StepError,
        rollback: sqlx::Error,
    },

    #[error("Failed to commit transaction: {0}")]
    Commit(#[source] sqlx::Error),

    #[error("Transaction cancelled before completion")]
    Cancelled,
}

impl TxError {
    /// The step whose failure aborted the transaction, if any
    pub fn failed_step(&self) -> Option<TxStep> {
        match self {
            TxError::Aborted(e) | TxError::RollbackFailed { source: e, .. } => Some(e.step),
            _ => None,
        }
    }

    /// Check if the rollback after a failed step also failed
    pub fn is_rollback_failure(&self) -> bool {
        matches!(self, TxError::RollbackFailed { .. })
    }

    /// Check if the same request may succeed when sent again
    pub fn is_retryable(&self) -> bool {
        match self {
            TxError::Cancelled | TxError::Begin(_) | TxError::Commit(_) => true,
            TxError::Aborted(e) | TxError::RollbackFailed { source: e, .. } => is_transient(&e.source),
        }
    }
}

/// SQLSTATE for a detected deadlock
const DEADLOCK_DETECTED: &str = "40P01";
/// SQLSTATE for a serialization failure
const SERIALIZATION_FAILURE: &str = "40001";

/// Missing rows and constraint violations are permanent; deadlock and
/// serialization aborts, and connection-level failures, are not.
fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::RowNotFound => false,
        sqlx::Error::Database(db) => matches!(
            db.code().as_deref(),
            Some(DEADLOCK_DETECTED) | Some(SERIALIZATION_FAILURE)
        ),
        _ => true,
    }
}
