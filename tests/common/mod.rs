//! Shared helpers for the integration tests.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use holdcart::config::Config;
use holdcart::handlers;
use holdcart::payments::StripeClient;
use holdcart::state::AppState;

pub const TEST_ADMIN_PASSWORD: &str = "staff-password";

pub fn test_config(admin_password: Option<&str>) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        base_url: "http://127.0.0.1:0".to_string(),
        stripe_secret_key: "sk_test_123".to_string(),
        admin_password: admin_password.map(String::from),
        currency: "aud".to_string(),
        success_url: "http://127.0.0.1:0/success".to_string(),
        cancel_url: "http://127.0.0.1:0/cancelled".to_string(),
    }
}

/// App whose Stripe client points at the real API; only usable for requests
/// that are rejected before any provider call.
pub fn test_app(admin_password: Option<&str>) -> Router {
    test_app_with_stripe(admin_password, StripeClient::new("sk_test_123"))
}

pub fn test_app_with_stripe(admin_password: Option<&str>, stripe: StripeClient) -> Router {
    let state = AppState::new(test_config(admin_password), stripe);
    handlers::router().with_state(state)
}

pub async fn post_json(
    app: Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}
