//! # veza-api binary
//!
//! Resolves configuration from the environment, builds the provider
//! graph, and serves the consent API.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use veza_api::config::AppConfig;
use veza_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env()?;
    let port = config.port;
    let state = AppState::from_config(config)?;
    let app = veza_api::app(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "veza-api listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Install the tracing subscriber: `RUST_LOG` filtering, JSON output when
/// `VEZA_LOG_JSON=true`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,veza_api=debug"));

    let json = std::env::var("VEZA_LOG_JSON")
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
