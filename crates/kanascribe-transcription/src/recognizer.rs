//! Recognizer seams and the reader → session driver.
//!
//! A [`SpeechRecognizer`] wraps a model that is loaded once and shared by
//! every request. Each request opens its own [`RecognizerSession`], feeds it
//! chunks in order and consumes it with [`RecognizerSession::finish`], which
//! releases the per-request native state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::types::{ResultExt, TranscriptionError, TranscriptionResult};
use crate::waveform::{WaveformContract, WaveformReader};

/// A loaded, read-only recognition model.
pub trait SpeechRecognizer: Send + Sync {
    /// Sample rate every session expects.
    fn sample_rate(&self) -> u32;

    /// Short model identifier for logs.
    fn name(&self) -> &str;

    /// Start a fresh per-request session.
    fn create_session(&self) -> Result<Box<dyn RecognizerSession>, TranscriptionError>;
}

/// Per-request recognizer state.
pub trait RecognizerSession: Send {
    /// Append samples. Chunk boundaries are not meaningful.
    fn accept_waveform(&mut self, samples: &[i16]) -> Result<(), TranscriptionError>;

    /// Produce the final result and release the session.
    fn finish(self: Box<Self>) -> Result<TranscriptionResult, TranscriptionError>;
}

/// Read `path` and run it through a new session of `recognizer`.
///
/// The header is validated before a session is created, so a mismatching
/// file never reaches the recognizer. Blocking; see [`transcribe_waveform`].
pub fn transcribe_file(
    recognizer: &dyn SpeechRecognizer,
    path: &Path,
    chunk_samples: usize,
) -> Result<TranscriptionResult, TranscriptionError> {
    let contract = WaveformContract::pcm16_mono(recognizer.sample_rate());
    let reader = WaveformReader::open(path, &contract, chunk_samples)?;

    let mut session = recognizer.create_session()?;
    let mut chunks = 0usize;
    for chunk in reader {
        session.accept_waveform(&chunk?)?;
        chunks += 1;
    }
    debug!(chunks, model = recognizer.name(), "end of waveform, finalizing");
    session.finish()
}

/// Async wrapper running [`transcribe_file`] on the blocking pool.
pub async fn transcribe_waveform(
    recognizer: Arc<dyn SpeechRecognizer>,
    path: PathBuf,
    chunk_samples: usize,
) -> Result<TranscriptionResult, TranscriptionError> {
    tokio::task::spawn_blocking(move || transcribe_file(recognizer.as_ref(), &path, chunk_samples))
        .await
        .inference("transcription task")?
}
