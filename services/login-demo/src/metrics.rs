//! Prometheus metrics exposition
//!
//! - `login_started_total` (counter)
//! - `login_completed_total` (counter)
//! - `login_failed_total` (counter): label `reason`
//! - `api_requests_total` (counter): label `outcome`

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder and return a handle for `/metrics`.
pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    Ok(PrometheusBuilder::new().install_recorder()?)
}

pub fn record_login_started() {
    metrics::counter!("login_started_total").increment(1);
}

pub fn record_login_completed() {
    metrics::counter!("login_completed_total").increment(1);
}

pub fn record_login_failed(reason: &'static str) {
    metrics::counter!("login_failed_total", "reason" => reason).increment(1);
}

pub fn record_api_request(outcome: &'static str) {
    metrics::counter!("api_requests_total", "outcome" => outcome).increment(1);
}
