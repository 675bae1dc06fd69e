use anyhow::Context;
use clap::Parser;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use holdcart::config::Config;
use holdcart::payments::StripeClient;
use holdcart::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "holdcart", about = "Create payment-hold checkout links from an ad-hoc cart")]
struct Args {
    /// Bind host (overrides HOST)
    #[arg(long)]
    host: Option<String>,
    /// Bind port (overrides PORT)
    #[arg(long)]
    port: Option<u16>,
    /// Directory containing the form page and client script
    #[arg(long, default_value = "static")]
    assets: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "holdcart=info,tower_http=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let mut config = Config::from_env()?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    if config.admin_password.is_none() {
        tracing::warn!("ADMIN_PASSWORD is not set - hold requests will be rejected");
    }

    let stripe = StripeClient::new(&config.stripe_secret_key);
    let state = AppState::new(config, stripe);
    let addr = state.config.addr();

    // Serve the form assets, falling back to the form page for any
    // unmatched GET.
    let assets = ServeDir::new(&args.assets)
        .fallback(ServeFile::new(format!("{}/index.html", args.assets)));

    let app = holdcart::handlers::router()
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("holdcart listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
