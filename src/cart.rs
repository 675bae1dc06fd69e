//! Cart validation and provider line-item construction.
//!
//! All money handling happens in integer minor currency units (cents);
//! major-unit decimal strings exist only at the display boundary.

use serde::Deserialize;

use crate::error::{AppError, Result};

/// Longest image URL forwarded to the provider. Stripe caps image URLs at
/// 2048 characters; stay under it.
const MAX_IMAGE_URL_LEN: usize = 2000;

/// Name of the synthetic line item appended for the delivery fee.
pub const DELIVERY_FEE_NAME: &str = "Delivery & service fee";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldRequest {
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub internal_note: Option<String>,
    #[serde(default)]
    pub delivery_fee: Option<FormNumber>,
    #[serde(default)]
    pub items: Vec<HoldItem>,
    #[serde(default)]
    pub admin_password: Option<String>,
}

/// One cart row as submitted by the form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub unit_price: Option<FormNumber>,
    #[serde(default)]
    pub quantity: Option<FormNumber>,
}

/// Numeric form fields arrive as JSON numbers or as strings depending on the
/// client; accept both.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FormNumber {
    Number(f64),
    Text(String),
}

impl FormNumber {
    fn as_f64(&self) -> Option<f64> {
        match self {
            FormNumber::Number(n) => Some(*n),
            FormNumber::Text(s) => s.trim().parse().ok(),
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            FormNumber::Number(n) => Some(*n as i64),
            FormNumber::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// One provider-facing line item, money in minor units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub unit_amount: i64,
    pub quantity: i64,
}

/// Validated cart: product line items, the optional delivery-fee line item,
/// and the minor-unit total.
#[derive(Debug, Clone)]
pub struct Cart {
    pub items: Vec<LineItem>,
    pub delivery_fee: Option<LineItem>,
    pub total_minor: i64,
}

impl Cart {
    /// Everything sent to the provider: the items followed by the fee line.
    pub fn line_items(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter().chain(self.delivery_fee.as_ref())
    }

    pub fn delivery_fee_minor(&self) -> i64 {
        self.delivery_fee.as_ref().map_or(0, |fee| fee.unit_amount)
    }
}

/// Convert a major-unit amount to minor units, rounding half away from zero.
fn to_minor(major: f64) -> i64 {
    (major * 100.0).round() as i64
}

/// Format a minor-unit amount as a 2-decimal major-unit string.
pub fn format_major(minor: i64) -> String {
    format!("{}.{:02}", minor / 100, minor % 100)
}

/// Validate the request rows and build the provider line items.
///
/// Validation is strict: any invalid row fails the whole request rather than
/// being skipped.
pub fn build_cart(request: &HoldRequest) -> Result<Cart> {
    if request.items.is_empty() {
        return Err(AppError::BadRequest("At least one item is required.".into()));
    }

    let mut items = Vec::with_capacity(request.items.len());
    let mut total_minor: i64 = 0;

    for item in &request.items {
        let name = item.name.trim();
        let price = item.unit_price.as_ref().and_then(FormNumber::as_f64);
        // An absent quantity means the form's default row value of 1; anything
        // explicit must parse to a positive integer.
        let quantity = match &item.quantity {
            None => Some(1),
            Some(q) => q.as_i64(),
        };

        let (price, quantity) = match (price, quantity) {
            (Some(p), Some(q)) if !name.is_empty() && p.is_finite() && p >= 0.0 && q >= 1 => {
                (p, q)
            }
            _ => {
                return Err(AppError::BadRequest(
                    "Each item needs a name, a non-negative price and a positive quantity."
                        .into(),
                ));
            }
        };

        let unit_amount = to_minor(price);
        total_minor = total_minor.saturating_add(unit_amount.saturating_mul(quantity));

        items.push(LineItem {
            name: name.to_string(),
            description: item.description.trim().to_string(),
            image_url: acceptable_image_url(&item.image_url),
            unit_amount,
            quantity,
        });
    }

    let delivery_fee = delivery_fee_item(request.delivery_fee.as_ref());
    if let Some(fee) = &delivery_fee {
        total_minor = total_minor.saturating_add(fee.unit_amount);
    }

    Ok(Cart {
        items,
        delivery_fee,
        total_minor,
    })
}

/// The provider rejects malformed or over-long image URLs, so anything that
/// does not look like a short http(s) URL is dropped rather than forwarded.
fn acceptable_image_url(raw: &str) -> Option<String> {
    let url = raw.trim();
    let ok = url.len() <= MAX_IMAGE_URL_LEN
        && (url.starts_with("http://") || url.starts_with("https://"));
    ok.then(|| url.to_string())
}

/// An absent, unparsable or non-positive fee is treated as "no fee".
fn delivery_fee_item(fee: Option<&FormNumber>) -> Option<LineItem> {
    let fee = fee.and_then(FormNumber::as_f64)?;
    if !fee.is_finite() || fee <= 0.0 {
        return None;
    }

    Some(LineItem {
        name: DELIVERY_FEE_NAME.to_string(),
        description: "Delivery and service charges".to_string(),
        image_url: None,
        unit_amount: to_minor(fee),
        quantity: 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, price: f64, quantity: i64) -> HoldItem {
        HoldItem {
            name: name.to_string(),
            description: String::new(),
            image_url: String::new(),
            unit_price: Some(FormNumber::Number(price)),
            quantity: Some(FormNumber::Number(quantity as f64)),
        }
    }

    fn request(items: Vec<HoldItem>, delivery_fee: Option<FormNumber>) -> HoldRequest {
        HoldRequest {
            customer_email: None,
            internal_note: None,
            delivery_fee,
            items,
            admin_password: None,
        }
    }

    #[test]
    fn total_is_sum_of_rounded_minor_amounts() {
        let cart = build_cart(&request(
            vec![item("Jeans", 79.95, 1), item("Socks", 4.50, 3)],
            None,
        ))
        .unwrap();

        assert_eq!(cart.items[0].unit_amount, 7995);
        assert_eq!(cart.items[1].unit_amount, 450);
        assert_eq!(cart.total_minor, 7995 + 450 * 3);
        assert!(cart.delivery_fee.is_none());
    }

    #[test]
    fn jeans_example_formats_to_two_decimals() {
        let cart = build_cart(&request(vec![item("Jeans", 79.95, 1)], None)).unwrap();

        assert_eq!(cart.items[0].unit_amount, 7995);
        assert_eq!(cart.items[0].quantity, 1);
        assert_eq!(format_major(cart.total_minor), "79.95");
    }

    #[test]
    fn delivery_fee_appends_one_line_item_and_adds_to_total() {
        let cart = build_cart(&request(
            vec![item("Shirt", 40.0, 2)],
            Some(FormNumber::Number(10.0)),
        ))
        .unwrap();

        assert_eq!(cart.total_minor, 9000);
        assert_eq!(format_major(cart.total_minor), "90.00");

        let fee = cart.delivery_fee.as_ref().unwrap();
        assert_eq!(fee.name, DELIVERY_FEE_NAME);
        assert_eq!(fee.unit_amount, 1000);
        assert_eq!(fee.quantity, 1);
        assert_eq!(cart.line_items().count(), 2);
    }

    #[test]
    fn zero_or_negative_delivery_fee_is_ignored() {
        for fee in [
            FormNumber::Number(0.0),
            FormNumber::Number(-5.0),
            FormNumber::Text("".to_string()),
            FormNumber::Text("free".to_string()),
        ] {
            let cart = build_cart(&request(vec![item("Shirt", 40.0, 1)], Some(fee))).unwrap();
            assert!(cart.delivery_fee.is_none());
            assert_eq!(cart.total_minor, 4000);
        }
    }

    #[test]
    fn string_price_and_quantity_are_parsed() {
        let cart = build_cart(&request(
            vec![HoldItem {
                name: "Jacket".to_string(),
                description: String::new(),
                image_url: String::new(),
                unit_price: Some(FormNumber::Text(" 129.50 ".to_string())),
                quantity: Some(FormNumber::Text("2".to_string())),
            }],
            None,
        ))
        .unwrap();

        assert_eq!(cart.items[0].unit_amount, 12950);
        assert_eq!(cart.items[0].quantity, 2);
        assert_eq!(cart.total_minor, 25900);
    }

    #[test]
    fn empty_items_list_is_rejected() {
        let err = build_cart(&request(vec![], None)).unwrap_err();
        assert!(err.to_string().contains("At least one item"));
    }

    #[test]
    fn item_with_blank_name_fails_the_whole_request() {
        let err = build_cart(&request(
            vec![item("Shirt", 40.0, 1), item("   ", 5.0, 1)],
            None,
        ))
        .unwrap_err();
        assert!(err.to_string().contains("Each item needs"));
    }

    #[test]
    fn unparsable_price_is_rejected() {
        let bad = HoldItem {
            name: "Shirt".to_string(),
            description: String::new(),
            image_url: String::new(),
            unit_price: Some(FormNumber::Text("forty".to_string())),
            quantity: None,
        };
        assert!(build_cart(&request(vec![bad], None)).is_err());
    }

    #[test]
    fn missing_price_is_rejected() {
        let bad = HoldItem {
            name: "Shirt".to_string(),
            description: String::new(),
            image_url: String::new(),
            unit_price: None,
            quantity: None,
        };
        assert!(build_cart(&request(vec![bad], None)).is_err());
    }

    #[test]
    fn negative_price_is_rejected_but_zero_is_allowed() {
        assert!(build_cart(&request(vec![item("Sample", -1.0, 1)], None)).is_err());

        let cart = build_cart(&request(vec![item("Sample", 0.0, 1)], None)).unwrap();
        assert_eq!(cart.total_minor, 0);
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        assert!(build_cart(&request(vec![item("Shirt", 40.0, 0)], None)).is_err());
        assert!(build_cart(&request(vec![item("Shirt", 40.0, -2)], None)).is_err());
    }

    #[test]
    fn missing_quantity_defaults_to_one() {
        let row = HoldItem {
            name: "Shirt".to_string(),
            description: String::new(),
            image_url: String::new(),
            unit_price: Some(FormNumber::Number(40.0)),
            quantity: None,
        };
        let cart = build_cart(&request(vec![row], None)).unwrap();
        assert_eq!(cart.items[0].quantity, 1);
        assert_eq!(cart.total_minor, 4000);
    }

    #[test]
    fn image_url_is_forwarded_only_when_short_and_http() {
        let mut row = item("Shirt", 40.0, 1);

        row.image_url = "https://cdn.example.com/shirt.jpg".to_string();
        let cart = build_cart(&request(vec![row], None)).unwrap();
        assert_eq!(
            cart.items[0].image_url.as_deref(),
            Some("https://cdn.example.com/shirt.jpg")
        );
    }

    #[test]
    fn bad_image_urls_are_dropped_without_rejecting_the_item() {
        let long_url = format!("https://cdn.example.com/{}", "x".repeat(2000));
        for url in [
            "ftp://cdn.example.com/a.jpg",
            "cdn.example.com/a.jpg",
            long_url.as_str(),
        ] {
            let mut row = item("Shirt", 40.0, 1);
            row.image_url = url.to_string();
            let cart = build_cart(&request(vec![row], None)).unwrap();
            assert_eq!(cart.items[0].image_url, None, "url should be dropped: {url}");
        }
    }

    #[test]
    fn format_major_pads_cents() {
        assert_eq!(format_major(0), "0.00");
        assert_eq!(format_major(5), "0.05");
        assert_eq!(format_major(90), "0.90");
        assert_eq!(format_major(7995), "79.95");
        assert_eq!(format_major(9000), "90.00");
    }
}
