// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod assessment;
pub mod config;
pub mod controller;
pub mod error;
pub mod metrics;
pub mod prompt;
pub mod session;
pub mod validate;

// Pipeline pieces: provider adapter, response parser, presentation classes
pub mod analyze;

pub mod ai_bootstrap;

// ---- Re-exports for stable public API ----
pub use analyze::ai_adapter;
pub use crate::api::router;
pub use crate::assessment::{AnalysisResult, PoliticalLeaning, Tone};
pub use crate::controller::{AnalysisController, ClearOutcome, RequestState, SubmitOutcome};
pub use crate::error::{AnalysisError, ClientError, ParseError, ValidationError};

use tracing::info;

/// Build the full in-process app: config, provider client, sessions, metrics.
///
/// ```ignore
/// let router = news_bias_detector::app().await?;
/// ```
pub async fn app() -> anyhow::Result<axum::Router> {
    let ai = ai_bootstrap::AiRuntime::from_default()?;
    let sessions = session::SessionStore::new(ai.client.clone(), ai.cfg.max_sessions);
    let m = metrics::Metrics::init()?;
    info!(provider = ai.client.provider_name(), "router ready");
    Ok(router(api::AppState::new(sessions)).merge(m.router()))
}
