//! `KanascribeServer`: Axum HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::Json;
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::health::{self, HealthResponse};
use crate::metrics;
use crate::pipeline::{Pipeline, PipelineError, TranscribeResponse};
use crate::shutdown::ShutdownCoordinator;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Request pipeline.
    pub pipeline: Arc<Pipeline>,
    /// When the server started.
    pub start_time: Instant,
    /// Prometheus handle for `/metrics`.
    pub metrics_handle: PrometheusHandle,
}

/// Query string of `GET /transcribe`.
#[derive(Debug, Deserialize)]
pub struct TranscribeQuery {
    /// Opaque remote file id.
    #[serde(rename = "fileId")]
    pub file_id: Option<String>,
}

/// The kanascribe HTTP server.
pub struct KanascribeServer {
    config: ServerConfig,
    pipeline: Arc<Pipeline>,
    shutdown: Arc<ShutdownCoordinator>,
    start_time: Instant,
    metrics_handle: PrometheusHandle,
}

impl KanascribeServer {
    /// Create a new server.
    pub fn new(config: ServerConfig, pipeline: Pipeline, metrics_handle: PrometheusHandle) -> Self {
        let pipeline = Arc::new(pipeline);
        Self {
            config,
            shutdown: Arc::new(ShutdownCoordinator::new(Arc::clone(&pipeline))),
            pipeline,
            start_time: Instant::now(),
            metrics_handle,
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            pipeline: Arc::clone(&self.pipeline),
            start_time: self.start_time,
            metrics_handle: self.metrics_handle.clone(),
        };

        Router::new()
            .route("/transcribe", get(transcribe_handler))
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Bind the configured address and serve until shutdown is requested.
    ///
    /// Returns the bound address and the serving task; the task finishes once
    /// in-flight requests have drained after [`ShutdownCoordinator::shutdown`].
    /// Pass the task to [`ShutdownCoordinator::drain`].
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        let addr = listener.local_addr()?;
        let router = self.router();
        let token = self.shutdown.token();

        info!(%addr, scratch_dir = %self.pipeline.scratch_dir().display(), "kanascribe listening");

        let handle = tokio::spawn(async move {
            let served = axum::serve(listener, router)
                .with_graceful_shutdown(async move { token.cancelled().await })
                .await;
            if let Err(e) = served {
                error!(error = %e, "server stopped with error");
            }
        });
        Ok((addr, handle))
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the request pipeline.
    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }
}

/// GET /transcribe?fileId=
async fn transcribe_handler(
    State(state): State<AppState>,
    query: Result<Query<TranscribeQuery>, QueryRejection>,
) -> Result<Json<TranscribeResponse>, PipelineError> {
    let Query(query) = query.map_err(|e| PipelineError::InvalidQuery(e.body_text()))?;
    state.pipeline.run(query.file_id.as_deref()).await.map(Json)
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(
        state.start_time,
        state.pipeline.in_flight(),
        state.pipeline.sample_rate(),
    ))
}

/// GET /metrics
async fn metrics_handler(State(state): State<AppState>) -> String {
    metrics::render(&state.metrics_handle)
}
