//! Human-readable transaction summary for pasting into the provider's notes
//! field. Pure formatting, no side effects.

use std::fmt::Write;

use crate::cart::{Cart, DELIVERY_FEE_NAME, format_major};

fn or_na(field: Option<&str>) -> &str {
    field.map(str::trim).filter(|s| !s.is_empty()).unwrap_or("n/a")
}

/// Build the multi-line summary for a created hold session.
pub fn hold_note(
    session_id: &str,
    customer_email: Option<&str>,
    internal_note: Option<&str>,
    cart: &Cart,
    currency: &str,
) -> String {
    let currency = currency.to_uppercase();

    let mut note = String::from("Payment hold\n");
    let _ = writeln!(note, "Session ID: {}", session_id);
    let _ = writeln!(note, "Customer email: {}", or_na(customer_email));
    let _ = writeln!(note, "Internal note: {}\n", or_na(internal_note));

    note.push_str("Items:\n");
    for item in &cart.items {
        let _ = writeln!(
            note,
            "- {} x{} @ {} {}",
            item.name,
            item.quantity,
            currency,
            format_major(item.unit_amount)
        );
    }

    let _ = writeln!(
        note,
        "{}: {} {}",
        DELIVERY_FEE_NAME,
        currency,
        format_major(cart.delivery_fee_minor())
    );
    let _ = writeln!(
        note,
        "Total intended authorization (approx): {} {}",
        currency,
        format_major(cart.total_minor)
    );
    note.push_str("When the payment appears, search by this Session ID in the provider dashboard.");

    note
}
