//! Store module
//!
//! Persistence for accounts, transfers, entries and sessions.
//! The core only talks to storage through the traits defined here.

mod error;
mod postgres;
mod queries;
mod tx;

pub use error::{StepError, StoreError, TxError, TxStep};
pub use postgres::PgStore;
pub use queries::{CreateEntryParams, CreateSessionParams, CreateTransferParams, Queries};
pub use tx::{ordered_balance_updates, BalanceUpdate, TransferTx, TransferTxParams, TransferTxResult, UnitOfWork};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Account, Session};

/// Read access to refresh-token sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch the session with the given id.
    ///
    /// # Errors
    /// - `StoreError::NotFound` if there is no such session
    async fn get_session(&self, session_id: Uuid) -> Result<Session, StoreError>;
}

/// Everything the HTTP layer needs from storage.
#[async_trait]
pub trait Store: SessionStore {
    /// Fetch an account.
    ///
    /// # Errors
    /// - `StoreError::NotFound` if there is no such account
    async fn get_account(&self, account_id: i64) -> Result<Account, StoreError>;

    /// Run the transfer transaction.
    async fn transfer_tx(&self, params: TransferTxParams) -> Result<TransferTxResult, TxError>;
}
