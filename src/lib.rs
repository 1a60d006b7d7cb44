//! bank_api Library
//!
//! Banking backend: atomic transfers between accounts, guarded by
//! signed access tokens renewable through refresh-token sessions.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod handlers;
pub mod store;
pub mod token;
pub mod util;

mod error;

pub use config::Config;
pub use error::{AppError, AppResult, ErrorResponse};
pub use domain::{Account, Currency, Entry, OperationContext, Session, Transfer};
pub use store::{PgStore, Store, TransferTxParams, TransferTxResult, TxError};
pub use token::{JwtMaker, Maker, Payload, TokenError};
