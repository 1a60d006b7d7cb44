//! Domain module
//!
//! Core domain types shared by the store, the handlers and the API.

pub mod account;
pub mod context;
pub mod currency;
pub mod session;

pub use account::{Account, Entry, Transfer};
pub use context::OperationContext;
pub use currency::{is_supported_currency, Currency, UnsupportedCurrency};
pub use session::Session;
