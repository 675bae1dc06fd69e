use std::env;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub base_url: String,
    /// Secret key for the payment provider. Required.
    pub stripe_secret_key: String,
    /// Shared staff password gating the hold endpoint. The endpoint
    /// fail-closes when this is unset.
    pub admin_password: Option<String>,
    /// ISO 4217 currency code for provider line items (lowercase).
    pub currency: String,
    /// Where the provider redirects after a completed checkout.
    pub success_url: String,
    /// Where the provider redirects after an abandoned checkout.
    pub cancel_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let base_url =
            env::var("BASE_URL").unwrap_or_else(|_| format!("http://{}:{}", host, port));

        let stripe_secret_key =
            env::var("STRIPE_SECRET_KEY").context("STRIPE_SECRET_KEY is not set")?;

        let admin_password = env::var("ADMIN_PASSWORD").ok().filter(|p| !p.is_empty());

        let currency = env::var("CURRENCY")
            .map(|c| c.to_lowercase())
            .unwrap_or_else(|_| "aud".to_string());

        let success_url =
            env::var("SUCCESS_URL").unwrap_or_else(|_| format!("{}/success", base_url));
        let cancel_url =
            env::var("CANCEL_URL").unwrap_or_else(|_| format!("{}/cancelled", base_url));

        Ok(Self {
            host,
            port,
            base_url,
            stripe_secret_key,
            admin_password,
            currency,
            success_url,
            cancel_url,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
