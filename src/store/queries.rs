//! Queries
//!
//! Single-statement reads and writes. `Queries` borrows a connection; built
//! over a pooled connection it runs each statement on its own, built over a
//! `Transaction` every statement joins that transaction.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::domain::{Account, Entry, Session, Transfer};

/// Parameters for a new transfer record
#[derive(Debug, Clone, Copy)]
pub struct CreateTransferParams {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
}

/// Parameters for a new ledger entry
#[derive(Debug, Clone, Copy)]
pub struct CreateEntryParams {
    pub account_id: i64,
    pub amount: i64,
}

/// Parameters for a new session
#[derive(Debug, Clone)]
pub struct CreateSessionParams {
    pub id: Uuid,
    pub username: String,
    pub refresh_token: String,
    pub user_agent: String,
    pub client_ip: String,
    pub is_blocked: bool,
    pub expires_at: DateTime<Utc>,
}

/// Query set bound to one connection.
pub struct Queries<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> Queries<'c> {
    /// Bind queries to a connection.
    ///
    /// Pass `&mut *pool_connection` for plain queries or `&mut *transaction`
    /// for transaction-scoped ones.
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn create_transfer(&mut self, params: CreateTransferParams) -> Result<Transfer, sqlx::Error> {
        sqlx::query_as::<_, Transfer>(
            r#"
            INSERT INTO transfers (from_account_id, to_account_id, amount)
            VALUES ($1, $2, $3)
            RETURNING id, from_account_id, to_account_id, amount, created_at
            "#,
        )
        .bind(params.from_account_id)
        .bind(params.to_account_id)
        .bind(params.amount)
        .fetch_one(&mut *self.conn)
        .await
    }

    pub async fn create_entry(&mut self, params: CreateEntryParams) -> Result<Entry, sqlx::Error> {
        sqlx::query_as::<_, Entry>(
            r#"
            INSERT INTO entries (account_id, amount)
            VALUES ($1, $2)
            RETURNING id, account_id, amount, created_at
            "#,
        )
        .bind(params.account_id)
        .bind(params.amount)
        .fetch_one(&mut *self.conn)
        .await
    }

    /// Add `delta` to the stored balance in place.
    ///
    /// The increment is computed by the database under the row lock, so
    /// concurrent transfers on the same account compose without lost updates.
    /// Fails with `RowNotFound` if the account does not exist.
    pub async fn add_account_balance(&mut self, account_id: i64, delta: i64) -> Result<Account, sqlx::Error> {
        sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET balance = balance + $2
            WHERE id = $1
            RETURNING id, owner, balance, currency, created_at
            "#,
        )
        .bind(account_id)
        .bind(delta)
        .fetch_one(&mut *self.conn)
        .await
    }

    pub async fn get_account(&mut self, account_id: i64) -> Result<Option<Account>, sqlx::Error> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, owner, balance, currency, created_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&mut *self.conn)
        .await
    }

    /// Open an account with an initial balance (account onboarding and tests).
    pub async fn create_account(&mut self, owner: &str, balance: i64, currency: &str) -> Result<Account, sqlx::Error> {
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (owner, balance, currency)
            VALUES ($1, $2, $3)
            RETURNING id, owner, balance, currency, created_at
            "#,
        )
        .bind(owner)
        .bind(balance)
        .bind(currency)
        .fetch_one(&mut *self.conn)
        .await
    }

    pub async fn get_transfer(&mut self, transfer_id: i64) -> Result<Option<Transfer>, sqlx::Error> {
        sqlx::query_as::<_, Transfer>(
            r#"
            SELECT id, from_account_id, to_account_id, amount, created_at
            FROM transfers
            WHERE id = $1
            "#,
        )
        .bind(transfer_id)
        .fetch_optional(&mut *self.conn)
        .await
    }

    pub async fn get_session(&mut self, session_id: Uuid) -> Result<Option<Session>, sqlx::Error> {
        sqlx::query_as::<_, Session>(
            r#"
            SELECT id, username, refresh_token, user_agent, client_ip, is_blocked, expires_at, created_at
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&mut *self.conn)
        .await
    }

    /// Persist a session (written by the login flow).
    pub async fn create_session(&mut self, params: CreateSessionParams) -> Result<Session, sqlx::Error> {
        sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (id, username, refresh_token, user_agent, client_ip, is_blocked, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, username, refresh_token, user_agent, client_ip, is_blocked, expires_at, created_at
            "#,
        )
        .bind(params.id)
        .bind(params.username)
        .bind(params.refresh_token)
        .bind(params.user_agent)
        .bind(params.client_ip)
        .bind(params.is_blocked)
        .bind(params.expires_at)
        .fetch_one(&mut *self.conn)
        .await
    }
}
