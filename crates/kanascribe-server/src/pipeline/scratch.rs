//! Per-request scratch waveform files.
//!
//! A [`ScratchFile`] only reserves a unique path; the transcoder creates the
//! file. Deletion happens exactly once: through [`ScratchFile::remove`] when
//! the pipeline finishes, or from `Drop` when the request future is dropped
//! first. Failures are logged and counted, never returned.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::metrics::SCRATCH_CLEANUP_FAILURES_TOTAL;

/// A reserved scratch path, deleted when the guard is consumed or dropped.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
    removed: bool,
}

impl ScratchFile {
    /// Reserve `<dir>/<request_id>.wav`.
    pub fn allocate(dir: &Path, request_id: Uuid) -> Self {
        Self {
            path: dir.join(format!("{request_id}.wav")),
            removed: false,
        }
    }

    /// The reserved path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file if it exists.
    pub async fn remove(mut self) {
        self.removed = true;
        let result = tokio::fs::remove_file(&self.path).await;
        report(&self.path, result);
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if !self.removed {
            self.removed = true;
            report(&self.path, std::fs::remove_file(&self.path));
        }
    }
}

fn report(path: &Path, result: io::Result<()>) {
    match result {
        Ok(()) => debug!(path = %path.display(), "scratch file removed"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "scratch file never created");
        }
        Err(e) => {
            metrics::counter!(SCRATCH_CLEANUP_FAILURES_TOTAL).increment(1);
            warn!(path = %path.display(), error = %e, "failed to remove scratch file");
        }
    }
}

/// Create the scratch directory if it does not exist.
pub async fn prepare_scratch_dir(dir: &Path) -> io::Result<()> {
    tokio::fs::create_dir_all(dir).await
}
