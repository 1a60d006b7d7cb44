//! Transfer Handler
//!
//! Validates a transfer request and runs the transfer transaction.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{Account, Currency, OperationContext};
use crate::error::AppError;
use crate::store::{Store, StoreError, TransferTxParams, TransferTxResult, TxError};

use super::TransferCommand;

/// Handler for transfers between accounts
pub struct TransferHandler {
    store: Arc<dyn Store>,
    timeout: Duration,
}

impl TransferHandler {
    /// `timeout` bounds the whole transaction; when it elapses the
    /// transaction is dropped and rolled back.
    pub fn new(store: Arc<dyn Store>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Execute the transfer command
    pub async fn execute(
        &self,
        command: TransferCommand,
        context: &OperationContext,
    ) -> Result<TransferTxResult, AppError> {
        if command.amount <= 0 {
            return Err(AppError::InvalidRequest(format!(
                "Amount must be positive (got {})",
                command.amount
            )));
        }

        if command.from_account_id == command.to_account_id {
            return Err(AppError::SameAccountTransfer);
        }

        let currency: Currency = command
            .currency
            .parse()
            .map_err(|e: crate::domain::UnsupportedCurrency| AppError::InvalidRequest(e.to_string()))?;

        let from_account = self.valid_account(command.from_account_id, currency).await?;

        // Only the owner may move money out of an account
        let username = context
            .username
            .as_deref()
            .ok_or(AppError::MissingAccessToken)?;
        if from_account.owner != username {
            return Err(AppError::UnauthorizedTransfer);
        }

        self.valid_account(command.to_account_id, currency).await?;

        let params = TransferTxParams {
            from_account_id: command.from_account_id,
            to_account_id: command.to_account_id,
            amount: command.amount,
        };

        let result = tokio::time::timeout(self.timeout, self.store.transfer_tx(params))
            .await
            .unwrap_or(Err(TxError::Cancelled))?;

        tracing::info!(
            transfer_id = result.transfer.id,
            from_account_id = params.from_account_id,
            to_account_id = params.to_account_id,
            amount = params.amount,
            correlation_id = ?context.correlation_id,
            client_ip = ?context.client_ip,
            "Transfer completed"
        );

        Ok(result)
    }

    async fn valid_account(&self, account_id: i64, currency: Currency) -> Result<Account, AppError> {
        let account = self.store.get_account(account_id).await.map_err(|e| match e {
            StoreError::NotFound => AppError::AccountNotFound(account_id),
            other => AppError::Store(other),
        })?;

        if account.currency != currency.code() {
            return Err(AppError::CurrencyMismatch {
                account_id,
                account_currency: account.currency,
                requested: currency.code().to_string(),
            });
        }

        Ok(account)
    }
}
