//! The transcribe request pipeline.
//!
//! ```text
//! fileId → source URL → FETCHING (transcoder → scratch WAV)
//!        → TRANSCRIBING (WaveformReader → RecognizerSession)
//!        → CONVERTING (only for non-blank text) → DONE
//! ```
//!
//! Any stage failure ends the request as FAILED. The scratch file is deleted
//! whatever the terminal state.

pub mod errors;
pub mod scratch;
pub mod source;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use serde::Serialize;
use tracing::{Instrument, debug, error, info, info_span};
use uuid::Uuid;

use kanascribe_kana::ScriptConverter;
use kanascribe_settings::KanascribeSettings;
use kanascribe_transcription::{
    MediaTranscoder, SpeechRecognizer, TranscriptionResult, transcribe_waveform,
};

use crate::metrics::{
    TRANSCRIBE_DURATION_SECONDS, TRANSCRIBE_IN_FLIGHT, TRANSCRIBE_REQUESTS_TOTAL,
    TRANSCRIBE_STAGE_ERRORS_TOTAL,
};

pub use errors::PipelineError;
pub use scratch::{ScratchFile, prepare_scratch_dir};
pub use source::source_url;

/// Successful response body.
#[derive(Debug, Clone, Serialize)]
pub struct TranscribeResponse {
    /// Recognizer output.
    pub transcription: TranscriptionResult,
    /// Kana rendering of the text, `None` when the text was blank.
    pub kana: Option<String>,
}

/// Non-collaborator pipeline parameters.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Where scratch waveforms are written.
    pub scratch_dir: PathBuf,
    /// Source URL template containing `{fileId}`.
    pub url_template: String,
    /// Samples per chunk fed to the recognizer.
    pub chunk_samples: usize,
}

impl PipelineOptions {
    /// Extract the pipeline parameters from loaded settings.
    pub fn from_settings(settings: &KanascribeSettings) -> Self {
        Self {
            scratch_dir: settings.server.scratch_dir(),
            url_template: settings.source.url_template.clone(),
            chunk_samples: settings.recognition.chunk_samples,
        }
    }
}

/// Runs one request through fetch, recognition and conversion.
///
/// Collaborators are shared by every request; per-request state (scratch
/// file, recognizer session) lives inside [`Pipeline::run`].
pub struct Pipeline {
    transcoder: Arc<dyn MediaTranscoder>,
    recognizer: Arc<dyn SpeechRecognizer>,
    converter: Arc<dyn ScriptConverter>,
    options: PipelineOptions,
    in_flight: Arc<AtomicUsize>,
}

impl Pipeline {
    /// Assemble a pipeline from its collaborators.
    pub fn new(
        transcoder: Arc<dyn MediaTranscoder>,
        recognizer: Arc<dyn SpeechRecognizer>,
        converter: Arc<dyn ScriptConverter>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            transcoder,
            recognizer,
            converter,
            options,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Requests currently inside [`Pipeline::run`].
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Sample rate the recognizer requires.
    pub fn sample_rate(&self) -> u32 {
        self.recognizer.sample_rate()
    }

    /// Scratch directory.
    pub fn scratch_dir(&self) -> &Path {
        &self.options.scratch_dir
    }

    /// Source URL for `file_id`.
    pub fn source_url(&self, file_id: &str) -> String {
        source_url(&self.options.url_template, file_id)
    }

    /// Run one request. `file_id` is the raw query value, if any.
    pub async fn run(&self, file_id: Option<&str>) -> Result<TranscribeResponse, PipelineError> {
        let Some(file_id) = file_id.filter(|id| !id.is_empty()) else {
            metrics::counter!(TRANSCRIBE_REQUESTS_TOTAL, "outcome" => "rejected").increment(1);
            return Err(PipelineError::MissingFileId);
        };

        let _in_flight = InFlight::enter(&self.in_flight);
        let request_id = Uuid::now_v7();
        let span = info_span!("transcribe", file_id, %request_id);
        let started = Instant::now();

        let result = self.run_stages(file_id, request_id).instrument(span.clone()).await;

        let elapsed = started.elapsed();
        metrics::histogram!(TRANSCRIBE_DURATION_SECONDS).record(elapsed.as_secs_f64());
        let _enter = span.enter();
        match &result {
            Ok(response) => {
                metrics::counter!(TRANSCRIBE_REQUESTS_TOTAL, "outcome" => "ok").increment(1);
                info!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    chars = response.transcription.text.chars().count(),
                    kana = response.kana.is_some(),
                    "transcription complete"
                );
            }
            Err(e) => {
                let stage = e.stage();
                metrics::counter!(TRANSCRIBE_REQUESTS_TOTAL, "outcome" => "error").increment(1);
                metrics::counter!(TRANSCRIBE_STAGE_ERRORS_TOTAL, "stage" => stage).increment(1);
                error!(stage, error = %e, "transcription failed");
            }
        }
        result
    }

    async fn run_stages(
        &self,
        file_id: &str,
        request_id: Uuid,
    ) -> Result<TranscribeResponse, PipelineError> {
        let url = self.source_url(file_id);
        let scratch = ScratchFile::allocate(&self.options.scratch_dir, request_id);
        let outcome = self.process(&url, scratch.path()).await;
        scratch.remove().await;
        outcome
    }

    async fn process(&self, url: &str, path: &Path) -> Result<TranscribeResponse, PipelineError> {
        debug!(path = %path.display(), "fetching");
        self.transcoder.transcode(url, path).await?;

        debug!(model = self.recognizer.name(), "transcribing");
        let transcription = transcribe_waveform(
            Arc::clone(&self.recognizer),
            path.to_path_buf(),
            self.options.chunk_samples,
        )
        .await?;

        let kana = if transcription.text.trim().is_empty() {
            debug!("blank transcription, skipping kana conversion");
            None
        } else {
            debug!("converting");
            Some(self.converter.convert(&transcription.text).await?)
        };

        Ok(TranscribeResponse {
            transcription,
            kana,
        })
    }
}

/// Counts a request as in flight until dropped.
struct InFlight {
    counter: Arc<AtomicUsize>,
}

impl InFlight {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        let now = counter.fetch_add(1, Ordering::Relaxed) + 1;
        metrics::gauge!(TRANSCRIBE_IN_FLIGHT).set(now as f64);
        Self {
            counter: Arc::clone(counter),
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let now = self.counter.fetch_sub(1, Ordering::Relaxed) - 1;
        metrics::gauge!(TRANSCRIBE_IN_FLIGHT).set(now as f64);
    }
}
