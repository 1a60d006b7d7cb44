//! Command Handlers module
//!
//! Handlers that orchestrate the token renewal and transfer operations.

mod commands;
mod renew_token_handler;
mod transfer_handler;

pub use commands::*;
pub use renew_token_handler::{RenewAccessTokenHandler, RenewalError};
pub use transfer_handler::TransferHandler;
