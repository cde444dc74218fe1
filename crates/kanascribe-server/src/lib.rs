//! # kanascribe-server
//!
//! Axum HTTP server for the transcribe pipeline.
//!
//! - `GET /transcribe?fileId=`: fetch + transcode, recognize, convert to kana
//! - `GET /health`, `GET /metrics` (Prometheus)
//! - Per-request scratch files with guaranteed cleanup
//! - Graceful shutdown via `CancellationToken`

pub mod config;
pub mod health;
pub mod metrics;
pub mod pipeline;
pub mod server;
pub mod shutdown;

#[cfg(test)]
mod testing;

pub use config::ServerConfig;
pub use pipeline::{Pipeline, PipelineError, PipelineOptions, TranscribeResponse};
pub use server::{AppState, KanascribeServer};
pub use shutdown::{DrainReport, ShutdownCoordinator};
