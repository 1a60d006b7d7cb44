//! PostgreSQL store

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Account, Session};

use super::{
    Queries, SessionStore, Store, StoreError, TransferTx, TransferTxParams, TransferTxResult, TxError,
    UnitOfWork,
};

/// Store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new PgStore with a database pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run `work` inside a transaction.
    ///
    /// Commits if the work succeeds. Otherwise rolls back and returns the
    /// step error, together with the rollback error if the rollback failed too.
    /// Dropping the returned future before it completes drops the
    /// transaction, which rolls it back.
    pub async fn exec_tx<W: UnitOfWork>(&self, work: W) -> Result<W::Output, TxError> {
        let mut tx = self.pool.begin().await.map_err(TxError::Begin)?;

        let outcome = {
            let mut q = Queries::new(&mut *tx);
            work.run(&mut q).await
        };

        match outcome {
            Ok(output) => {
                tx.commit().await.map_err(TxError::Commit)?;
                Ok(output)
            }
            Err(step_err) => match tx.rollback().await {
                Ok(()) => Err(TxError::Aborted(step_err)),
                Err(rollback) => Err(TxError::RollbackFailed {
                    source: step_err,
                    rollback,
                }),
            },
        }
    }

    /// Open an account
    pub async fn create_account(&self, owner: &str, balance: i64, currency: &str) -> Result<Account, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let account = Queries::new(&mut *conn)
            .create_account(owner, balance, currency)
            .await?;
        Ok(account)
    }

    /// Persist a session
    pub async fn create_session(&self, params: super::CreateSessionParams) -> Result<Session, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let session = Queries::new(&mut *conn).create_session(params).await?;
        Ok(session)
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn get_session(&self, session_id: Uuid) -> Result<Session, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Queries::new(&mut *conn)
            .get_session(session_id)
            .await?
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn get_account(&self, account_id: i64) -> Result<Account, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Queries::new(&mut *conn)
            .get_account(account_id)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn transfer_tx(&self, params: TransferTxParams) -> Result<TransferTxResult, TxError> {
        let result = self.exec_tx(TransferTx::new(params)).await;

        match &result {
            Ok(r) => tracing::debug!(
                transfer_id = r.transfer.id,
                from_account_id = params.from_account_id,
                to_account_id = params.to_account_id,
                amount = params.amount,
                "Transfer committed"
            ),
            Err(e) if e.is_rollback_failure() => tracing::error!("Transfer rollback failed: {}", e),
            Err(e) => tracing::warn!("Transfer aborted: {}", e),
        }

        result
    }
}
