//! News Bias Detector — Binary Entrypoint
//! Boots the Axum HTTP server with the analysis pipeline, sessions, and metrics.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact console logs. `RUST_LOG` overrides the default filter.
/// Uses `try_init` because the Shuttle runtime may already have installed a subscriber.
fn enable_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("news_bias_detector=info,analysis=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    // This enables GEMINI_API_KEY / AI_CONFIG_PATH from .env.
    let _ = dotenvy::dotenv();

    enable_tracing();

    let router = news_bias_detector::app().await?;
    Ok(router.into())
}
