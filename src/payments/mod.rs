mod stripe;

pub use stripe::*;

use serde::{Deserialize, Serialize};

/// Provider-issued checkout session backing a hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
    /// Identifier of the authorization-only payment intent, when the
    /// provider returns one at creation time.
    pub payment_intent: Option<String>,
}
