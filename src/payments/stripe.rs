use reqwest::Client;
use serde::Deserialize;

use crate::cart::Cart;
use crate::error::{AppError, Result};

use super::CheckoutSession;

const STRIPE_API_BASE: &str = "https://api.stripe.com";

/// Everything needed to open a hold session beyond the cart itself.
#[derive(Debug, Clone, Copy)]
pub struct HoldSessionParams<'a> {
    pub customer_email: Option<&'a str>,
    pub internal_note: Option<&'a str>,
    /// Delivery fee in major units, as already formatted for display.
    pub delivery_fee_display: &'a str,
    pub currency: &'a str,
    pub success_url: &'a str,
    pub cancel_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateSessionResponse {
    id: String,
    url: Option<String>,
    payment_intent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: String,
    api_base: String,
}

impl StripeClient {
    pub fn new(secret_key: &str) -> Self {
        Self::with_api_base(secret_key, STRIPE_API_BASE)
    }

    /// Point the client at a different API host (used by tests).
    pub fn with_api_base(secret_key: &str, api_base: &str) -> Self {
        Self {
            client: Client::new(),
            secret_key: secret_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Create a manual-capture Checkout session: the customer's card is
    /// authorized at checkout and captured later, out of band.
    ///
    /// Single attempt, no retry; provider errors are surfaced verbatim.
    pub async fn create_hold_session(
        &self,
        cart: &Cart,
        params: HoldSessionParams<'_>,
    ) -> Result<CheckoutSession> {
        let mut form: Vec<(String, String)> = vec![
            ("mode".into(), "payment".into()),
            ("success_url".into(), params.success_url.into()),
            ("cancel_url".into(), params.cancel_url.into()),
            ("payment_intent_data[capture_method]".into(), "manual".into()),
            (
                "payment_intent_data[description]".into(),
                params.internal_note.unwrap_or("Payment hold").into(),
            ),
            (
                "payment_intent_data[metadata][internal_note]".into(),
                params.internal_note.unwrap_or("").into(),
            ),
            (
                "payment_intent_data[metadata][delivery_fee]".into(),
                params.delivery_fee_display.into(),
            ),
        ];

        if let Some(email) = params.customer_email {
            form.push(("customer_email".into(), email.into()));
        }

        for (i, item) in cart.line_items().enumerate() {
            form.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
            form.push((
                format!("line_items[{i}][price_data][currency]"),
                params.currency.into(),
            ));
            form.push((
                format!("line_items[{i}][price_data][unit_amount]"),
                item.unit_amount.to_string(),
            ));
            form.push((
                format!("line_items[{i}][price_data][product_data][name]"),
                item.name.clone(),
            ));
            if !item.description.is_empty() {
                form.push((
                    format!("line_items[{i}][price_data][product_data][description]"),
                    item.description.clone(),
                ));
            }
            if let Some(url) = &item.image_url {
                form.push((
                    format!("line_items[{i}][price_data][product_data][images][0]"),
                    url.clone(),
                ));
            }
        }

        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Stripe API error: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            // Unwrap the provider's own message when the body has the
            // standard error shape.
            let message = serde_json::from_str::<StripeErrorResponse>(&error_text)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or(error_text);
            return Err(AppError::Internal(format!("Stripe API error: {}", message)));
        }

        let session: CreateSessionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to parse Stripe response: {}", e)))?;

        let url = session
            .url
            .ok_or_else(|| AppError::Internal("Stripe returned no checkout URL".into()))?;

        Ok(CheckoutSession {
            id: session.id,
            url,
            payment_intent: session.payment_intent,
        })
    }
}
