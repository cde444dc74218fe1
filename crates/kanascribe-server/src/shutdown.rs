//! Stop accepting requests, then drain in-flight transcriptions.
//!
//! Cancelling the token makes `axum::serve` stop accepting connections and
//! wait for open ones. Requests still running when the drain times out are
//! dropped with the runtime; their scratch guards remove the files then.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::pipeline::Pipeline;

/// Default time allowed for in-flight transcriptions to finish.
const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of [`ShutdownCoordinator::drain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainReport {
    /// Transcriptions running when shutdown began.
    pub in_flight_at_start: usize,
    /// Transcriptions still running when the timeout expired.
    pub abandoned: usize,
}

impl DrainReport {
    /// Every request finished before the timeout.
    pub fn is_clean(&self) -> bool {
        self.abandoned == 0
    }
}

/// Owns the server's cancellation token and knows how busy the pipeline is.
pub struct ShutdownCoordinator {
    token: CancellationToken,
    pipeline: Arc<Pipeline>,
}

impl ShutdownCoordinator {
    /// Coordinator for a server running `pipeline`.
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self {
            token: CancellationToken::new(),
            pipeline,
        }
    }

    /// Token the serving task waits on.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Stop accepting new connections.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Whether a shutdown has been initiated.
    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel, then wait up to `timeout` for the serving task to finish.
    pub async fn drain(&self, mut server: JoinHandle<()>, timeout: Option<Duration>) -> DrainReport {
        let timeout = timeout.unwrap_or(DEFAULT_DRAIN_TIMEOUT);
        let in_flight_at_start = self.pipeline.in_flight();

        self.shutdown();
        info!(
            in_flight = in_flight_at_start,
            timeout_secs = timeout.as_secs(),
            "draining in-flight transcriptions"
        );

        let abandoned = match tokio::time::timeout(timeout, &mut server).await {
            Ok(_) => 0,
            Err(_) => {
                let abandoned = self.pipeline.in_flight();
                warn!(
                    abandoned,
                    "drain timed out after {timeout:?}, remaining transcriptions will be dropped"
                );
                abandoned
            }
        };

        DrainReport {
            in_flight_at_start,
            abandoned,
        }
    }
}
