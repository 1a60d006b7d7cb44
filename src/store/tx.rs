//! Transfer transaction
//!
//! Moves money between two accounts as one unit of work: a transfer record,
//! a debit entry, a credit entry and two balance increments.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Account, Entry, Transfer};

use super::error::{StepError, TxStep};
use super::queries::{CreateEntryParams, CreateTransferParams, Queries};

/// Work executed inside one database transaction.
///
/// The work item is consumed and its output returned by value once the
/// transaction commits.
#[async_trait]
pub trait UnitOfWork: Send {
    type Output: Send;

    async fn run(self, q: &mut Queries<'_>) -> Result<Self::Output, StepError>;
}

/// Input of the transfer transaction.
///
/// Validation (positive amount, existing accounts, currency) is done by the
/// caller; the transaction applies exactly the arithmetic it is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferTxParams {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
}

/// Everything written by one transfer, with both accounts as they are after
/// the update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferTxResult {
    pub transfer: Transfer,
    pub from_account: Account,
    pub to_account: Account,
    pub from_entry: Entry,
    pub to_entry: Entry,
}

/// One relative balance change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceUpdate {
    pub account_id: i64,
    pub delta: i64,
}

/// The two balance updates of a transfer, in lock order.
///
/// Rows are always locked smaller id first, whichever side of the transfer
/// that account is on. With one global order no two transfers can wait on
/// each other's rows in a cycle, so A->B running against B->A cannot deadlock.
pub fn ordered_balance_updates(params: &TransferTxParams) -> [BalanceUpdate; 2] {
    let debit = BalanceUpdate {
        account_id: params.from_account_id,
        delta: -params.amount,
    };
    let credit = BalanceUpdate {
        account_id: params.to_account_id,
        delta: params.amount,
    };

    if params.from_account_id < params.to_account_id {
        [debit, credit]
    } else {
        [credit, debit]
    }
}

/// The transfer unit of work.
#[derive(Debug)]
pub struct TransferTx {
    params: TransferTxParams,
}

impl TransferTx {
    pub fn new(params: TransferTxParams) -> Self {
        Self { params }
    }
}

#[async_trait]
impl UnitOfWork for TransferTx {
    type Output = TransferTxResult;

    async fn run(self, q: &mut Queries<'_>) -> Result<TransferTxResult, StepError> {
        let TransferTxParams {
            from_account_id,
            to_account_id,
            amount,
        } = self.params;

        let transfer = q
            .create_transfer(CreateTransferParams {
                from_account_id,
                to_account_id,
                amount,
            })
            .await
            .map_err(|e| StepError::new(TxStep::CreateTransfer, e))?;

        let from_entry = q
            .create_entry(CreateEntryParams {
                account_id: from_account_id,
                amount: -amount,
            })
            .await
            .map_err(|e| StepError::new(TxStep::CreateEntry { account_id: from_account_id }, e))?;

        let to_entry = q
            .create_entry(CreateEntryParams {
                account_id: to_account_id,
                amount,
            })
            .await
            .map_err(|e| StepError::new(TxStep::CreateEntry { account_id: to_account_id }, e))?;

        let [first, second] = ordered_balance_updates(&self.params);
        let first_account = add_balance(q, first).await?;
        let second_account = add_balance(q, second).await?;

        let (from_account, to_account) = if first.account_id == from_account_id {
            (first_account, second_account)
        } else {
            (second_account, first_account)
        };

        Ok(TransferTxResult {
            transfer,
            from_account,
            to_account,
            from_entry,
            to_entry,
        })
    }
}

async fn add_balance(q: &mut Queries<'_>, update: BalanceUpdate) -> Result<Account, StepError> {
    q.add_account_balance(update.account_id, update.delta)
        .await
        .map_err(|e| {
            StepError::new(
                TxStep::AddAccountBalance {
                    account_id: update.account_id,
                },
                e,
            )
        })
}
