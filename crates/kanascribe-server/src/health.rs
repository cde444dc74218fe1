//! `/health` endpoint.

use serde::Serialize;
use std::time::Instant;

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `"ok"` when the server is running.
    pub status: String,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// Transcribe pipelines currently running.
    pub in_flight: usize,
    /// Sample rate the loaded recognizer requires.
    pub sample_rate: u32,
}

/// Build a health response from live counters.
pub fn health_check(start_time: Instant, in_flight: usize, sample_rate: u32) -> HealthResponse {
    HealthResponse {
        status: "ok".into(),
        uptime_secs: start_time.elapsed().as_secs(),
        in_flight,
        sample_rate,
    }
}
