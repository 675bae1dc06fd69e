use axum::extract::State;
use serde::Serialize;
use subtle::ConstantTimeEq;

use crate::cart::{self, HoldRequest};
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::note;
use crate::payments::HoldSessionParams;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldResponse {
    pub checkout_url: String,
    pub session_id: String,
    /// Total intended authorization in major units, 2 decimals.
    pub total_amount: String,
    pub delivery_fee: String,
    pub note_text: String,
}

pub async fn create_hold(
    State(state): State<AppState>,
    Json(request): Json<HoldRequest>,
) -> Result<Json<HoldResponse>> {
    // The admin gate comes first; nothing is validated or sent upstream until
    // it passes. No configured password means the gate cannot pass.
    let expected = state.config.admin_password.as_deref().ok_or_else(|| {
        AppError::Internal("Server misconfigured, ADMIN_PASSWORD is not set.".into())
    })?;
    let supplied = request.admin_password.as_deref().unwrap_or("");
    if !bool::from(supplied.as_bytes().ct_eq(expected.as_bytes())) {
        return Err(AppError::Forbidden("Invalid admin password.".into()));
    }

    let cart = cart::build_cart(&request)?;

    let customer_email = request
        .customer_email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());
    let internal_note = request
        .internal_note
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());
    let delivery_fee = cart::format_major(cart.delivery_fee_minor());
    let total_amount = cart::format_major(cart.total_minor);

    let session = state
        .stripe
        .create_hold_session(
            &cart,
            HoldSessionParams {
                customer_email,
                internal_note,
                delivery_fee_display: &delivery_fee,
                currency: &state.config.currency,
                success_url: &state.config.success_url,
                cancel_url: &state.config.cancel_url,
            },
        )
        .await?;

    let note_text = note::hold_note(
        &session.id,
        customer_email,
        internal_note,
        &cart,
        &state.config.currency,
    );

    tracing::info!(
        "Created hold session {} ({} line items, total {} {})",
        session.id,
        cart.line_items().count(),
        state.config.currency,
        total_amount
    );

    Ok(Json(HoldResponse {
        checkout_url: session.url,
        session_id: session.id,
        total_amount,
        delivery_fee,
        note_text,
    }))
}
