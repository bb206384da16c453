use std::time::Duration;

use axum::{routing::get, Router};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub const REQUESTS_TOTAL: &str = "bias_analysis_requests_total";
pub const REJECTED_TOTAL: &str = "bias_analysis_rejected_total";
pub const PROVIDER_DURATION_MS: &str = "bias_analysis_provider_duration_ms";

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder once per process; later calls reuse it.
    pub fn init() -> anyhow::Result<Self> {
        let handle = HANDLE
            .get_or_try_init(|| PrometheusBuilder::new().install_recorder())?
            .clone();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// `outcome` is "succeeded" or the error kind.
pub fn record_outcome(outcome: &'static str) {
    counter!(REQUESTS_TOTAL, "outcome" => outcome).increment(1);
}

pub fn record_rejected(action: &'static str) {
    counter!(REJECTED_TOTAL, "action" => action).increment(1);
}

pub fn record_provider_latency(provider: &'static str, elapsed: Duration) {
    histogram!(PROVIDER_DURATION_MS, "provider" => provider).record(elapsed.as_secs_f64() * 1000.0);
}
