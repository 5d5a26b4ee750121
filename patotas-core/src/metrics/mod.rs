//! Metrics for observability
//!
//! Counters are recorded through the `metrics` facade; nothing is exported
//! unless [`install_prometheus_exporter`] is called by the binary.

use crate::config::MetricsConfig;
use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::PrometheusBuilder;
use thiserror::Error;

/// Patotas created
pub const PATOTAS_CREATED: &str = "patotas_created_total";
/// Invite code redemptions, labelled by `outcome`
pub const INVITE_REDEMPTIONS: &str = "patotas_invite_redemptions_total";
/// Access gate decisions, labelled by `outcome`
pub const ACCESS_CHECKS: &str = "patotas_access_checks_total";
/// Sign-in attempts, labelled by `outcome`
pub const SIGN_INS: &str = "patotas_sign_ins_total";

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to install Prometheus exporter: {0}")]
    InstallFailed(String),
}

/// Register metric descriptions
pub fn init_metrics() {
    describe_counter!(PATOTAS_CREATED, "Number of patotas created");
    describe_counter!(INVITE_REDEMPTIONS, "Invite code redemptions by outcome");
    describe_counter!(ACCESS_CHECKS, "Access gate decisions by outcome");
    describe_counter!(SIGN_INS, "Sign-in attempts by outcome");
}

/// Install the Prometheus exporter with an HTTP listener
///
/// Must be called from within a Tokio runtime.
pub fn install_prometheus_exporter(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.bind_address)
        .install()
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;

    init_metrics();
    Ok(())
}

/// Count an outcome for a labelled counter
pub fn record_outcome(name: &'static str, outcome: &'static str) {
    counter!(name, "outcome" => outcome).increment(1);
}

/// Count one occurrence
pub fn record_counter(name: &'static str) {
    counter!(name).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_a_noop() {
        init_metrics();
        record_counter(PATOTAS_CREATED);
        record_outcome(INVITE_REDEMPTIONS, "joined");
    }
}
