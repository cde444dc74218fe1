//! Prometheus metrics recorder and metric names.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the Prometheus metrics recorder (global).
///
/// Returns the `PrometheusHandle` used to render the `/metrics` endpoint.
/// Call once at startup before any metrics are recorded.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("prometheus metrics recorder installed");
    Ok(handle)
}

/// Render Prometheus text format from the installed recorder.
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

/// Transcribe requests total (counter, labels: outcome).
pub const TRANSCRIBE_REQUESTS_TOTAL: &str = "transcribe_requests_total";
/// Pipeline failures total (counter, labels: stage).
pub const TRANSCRIBE_STAGE_ERRORS_TOTAL: &str = "transcribe_stage_errors_total";
/// End-to-end pipeline duration seconds (histogram).
pub const TRANSCRIBE_DURATION_SECONDS: &str = "transcribe_duration_seconds";
/// Pipelines currently running (gauge).
pub const TRANSCRIBE_IN_FLIGHT: &str = "transcribe_in_flight";
/// Scratch files that could not be deleted (counter).
pub const SCRATCH_CLEANUP_FAILURES_TOTAL: &str = "scratch_cleanup_failures_total";
