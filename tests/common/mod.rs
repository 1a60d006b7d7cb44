//! Common test utilities
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use uuid::Uuid;

use bank_api::api::AppState;
use bank_api::domain::{Account, Entry, Session, Transfer};
use bank_api::store::{
    SessionStore, StepError, Store, StoreError, TransferTxParams, TransferTxResult, TxError, TxStep,
};
use bank_api::token::JwtMaker;

pub const SECRET: &str = "0123456789abcdefghijklmnopqrstuv";
pub const ACCESS_TOKEN_DURATION: Duration = Duration::from_secs(900);
pub const REFRESH_TOKEN_DURATION: Duration = Duration::from_secs(86_400);

// =========================================================================
// In-memory store
// =========================================================================

#[derive(Default)]
struct Tables {
    accounts: HashMap<i64, Account>,
    sessions: HashMap<Uuid, Session>,
    transfers: Vec<Transfer>,
    entries: Vec<Entry>,
}

/// Store kept in memory. One lock guards every table, so a transfer is
/// applied all at once or not at all.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn add_account(&self, owner: &str, balance: i64, currency: &str) -> Account {
        let mut tables = self.tables.lock().unwrap();
        let account = Account {
            id: tables.accounts.len() as i64 + 1,
            owner: owner.to_string(),
            balance,
            currency: currency.to_string(),
            created_at: Utc::now(),
        };
        tables.accounts.insert(account.id, account.clone());
        account
    }

    pub fn add_session(&self, session: Session) {
        self.tables.lock().unwrap().sessions.insert(session.id, session);
    }

    pub fn transfer_count(&self) -> usize {
        self.tables.lock().unwrap().transfers.len()
    }

    pub fn balance(&self, account_id: i64) -> i64 {
        self.tables.lock().unwrap().accounts[&account_id].balance
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get_session(&self, session_id: Uuid) -> Result<Session, StoreError> {
        self.tables
            .lock()
            .unwrap()
            .sessions
            .get(&session_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_account(&self, account_id: i64) -> Result<Account, StoreError> {
        self.tables
            .lock()
            .unwrap()
            .accounts
            .get(&account_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn transfer_tx(&self, params: TransferTxParams) -> Result<TransferTxResult, TxError> {
        let mut tables = self.tables.lock().unwrap();

        for account_id in [params.from_account_id, params.to_account_id] {
            if !tables.accounts.contains_key(&account_id) {
                return Err(TxError::Aborted(StepError::new(
                    TxStep::AddAccountBalance { account_id },
                    sqlx::Error::RowNotFound,
                )));
            }
        }

        let now = Utc::now();
        let transfer = Transfer {
            id: tables.transfers.len() as i64 + 1,
            from_account_id: params.from_account_id,
            to_account_id: params.to_account_id,
            amount: params.amount,
            created_at: now,
        };
        let from_entry = Entry {
            id: tables.entries.len() as i64 + 1,
            account_id: params.from_account_id,
            amount: -params.amount,
            created_at: now,
        };
        let to_entry = Entry {
            id: from_entry.id + 1,
            account_id: params.to_account_id,
            amount: params.amount,
            created_at: now,
        };

        if let Some(from) = tables.accounts.get_mut(&params.from_account_id) {
            from.balance -= params.amount;
        }
        if let Some(to) = tables.accounts.get_mut(&params.to_account_id) {
            to.balance += params.amount;
        }

        tables.transfers.push(transfer.clone());
        tables.entries.push(from_entry.clone());
        tables.entries.push(to_entry.clone());

        Ok(TransferTxResult {
            transfer,
            from_account: tables.accounts[&params.from_account_id].clone(),
            to_account: tables.accounts[&params.to_account_id].clone(),
            from_entry,
            to_entry,
        })
    }
}

/// App state over an in-memory store
pub fn memory_state(store: Arc<MemoryStore>) -> (AppState, Arc<JwtMaker>) {
    let maker = Arc::new(JwtMaker::new(SECRET).expect("valid test secret"));
    let state = AppState {
        store,
        token_maker: maker.clone(),
        access_token_duration: ACCESS_TOKEN_DURATION,
        transfer_timeout: Duration::from_secs(5),
    };
    (state, maker)
}

/// A session matching a freshly created refresh token
pub fn session_for(refresh_token: &str, payload: &bank_api::Payload) -> Session {
    Session {
        id: payload.id,
        username: payload.username.clone(),
        refresh_token: refresh_token.to_string(),
        user_agent: "integration-test".to_string(),
        client_ip: "127.0.0.1".to_string(),
        is_blocked: false,
        expires_at: payload.expired_at,
        created_at: payload.issued_at,
    }
}

// =========================================================================
// PostgreSQL
// =========================================================================

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id BIGSERIAL PRIMARY KEY,
    owner VARCHAR NOT NULL,
    balance BIGINT NOT NULL,
    currency VARCHAR NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS entries (
    id BIGSERIAL PRIMARY KEY,
    account_id BIGINT NOT NULL REFERENCES accounts (id),
    amount BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS transfers (
    id BIGSERIAL PRIMARY KEY,
    from_account_id BIGINT NOT NULL REFERENCES accounts (id),
    to_account_id BIGINT NOT NULL REFERENCES accounts (id),
    amount BIGINT NOT NULL CHECK (amount > 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS sessions (
    id UUID PRIMARY KEY,
    username VARCHAR NOT NULL,
    refresh_token VARCHAR NOT NULL,
    user_agent VARCHAR NOT NULL,
    client_ip VARCHAR NOT NULL,
    is_blocked BOOLEAN NOT NULL DEFAULT FALSE,
    expires_at TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
"#;

/// Connect to the test database and ensure the tables exist.
///
/// Database tests are `#[ignore]`d; run them with
/// `cargo test -- --ignored` against a reachable PostgreSQL.
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    // Multiple statements: run as a simple (unprepared) query
    pool.execute(SCHEMA).await.expect("Failed to create schema");

    pool
}
