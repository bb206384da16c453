// src/analyze/mod.rs
//! Analysis pipeline entry: prompt -> provider call -> parse.
//! Validation happens before this (see `validate`), classification after (see `classify`).

pub mod ai_adapter;
pub mod classify;
pub mod parser;

use std::time::Instant;

use tracing::{info, warn};

use crate::assessment::AnalysisResult;
use crate::error::AnalysisError;
use crate::metrics;
use crate::prompt;

// Re-export convenient types.
pub use crate::analyze::ai_adapter::{AnalysisClient, DynAnalysisClient, MockClient};
pub use crate::analyze::classify::{
    leaning_category, severity_band, tone_icon, LeaningCategory, Presentation, SeverityBand,
};

/// Short anonymized id for a submission: first 6 bytes of SHA-256, hex.
/// Raw news text never goes to the logs.
pub fn fingerprint(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Run one already-validated text through the provider and the parser.
/// Exactly one outbound call, no retry.
pub async fn run_analysis(
    client: &dyn AnalysisClient,
    text: &str,
) -> Result<AnalysisResult, AnalysisError> {
    let id = fingerprint(text);
    let provider = client.provider_name();
    let prompt = prompt::build(text);

    let started = Instant::now();
    let raw = client.send(&prompt).await;
    let elapsed = started.elapsed();
    metrics::record_provider_latency(provider, elapsed);

    let raw = match raw {
        Ok(raw) => raw,
        Err(e) => {
            warn!(target: "analysis", %id, provider, elapsed_ms = elapsed.as_millis() as u64, error = %e, "provider call failed");
            return Err(e.into());
        }
    };
    info!(target: "analysis", %id, provider, elapsed_ms = elapsed.as_millis() as u64, bytes = raw.len(), "provider replied");

    parser::parse(&raw).map_err(|e| {
        warn!(target: "analysis", %id, error = %e, "provider reply rejected by parser");
        AnalysisError::from(e)
    })
}
