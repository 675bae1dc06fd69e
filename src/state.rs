use std::sync::Arc;

use crate::config::Config;
use crate::payments::StripeClient;

/// Shared application state. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub stripe: StripeClient,
}

impl AppState {
    pub fn new(config: Config, stripe: StripeClient) -> Self {
        Self {
            config: Arc::new(config),
            stripe,
        }
    }
}
