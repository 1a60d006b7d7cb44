//! Shared application state

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::store::Store;
use crate::token::Maker;

/// State handed to every handler and to the auth middleware
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub token_maker: Arc<dyn Maker>,
    pub access_token_duration: Duration,
    pub transfer_timeout: Duration,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, token_maker: Arc<dyn Maker>, config: &Config) -> Self {
        Self {
            store,
            token_maker,
            access_token_duration: config.access_token_duration,
            transfer_timeout: config.transfer_timeout,
        }
    }
}
