//! Whisper backend via `whisper-rs`.
//!
//! The `WhisperContext` (model weights) is shared; every session gets its own
//! `WhisperState`, created at finalization and dropped with the session.

use std::sync::{Arc, Once};

use tracing::debug;
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, install_logging_hooks,
};

use crate::model::RecognizerConfig;
use crate::recognizer::{RecognizerSession, SpeechRecognizer};
use crate::types::{ResultExt, Segment, TranscriptionError, TranscriptionResult};

/// whisper.cpp only accepts 16 kHz input.
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

static LOGGING_HOOKS_INSTALLED: Once = Once::new();

/// Shared Whisper model.
pub struct WhisperRecognizer {
    context: Arc<WhisperContext>,
    language: String,
    threads: Option<usize>,
    model_name: String,
}

impl WhisperRecognizer {
    /// Load weights from `config.paths().weights`. Blocking.
    pub fn load(config: RecognizerConfig) -> Result<Self, TranscriptionError> {
        if config.sample_rate != WHISPER_SAMPLE_RATE {
            return Err(TranscriptionError::ModelNotAvailable(format!(
                "whisper requires a {WHISPER_SAMPLE_RATE} Hz sample rate, configured {}",
                config.sample_rate
            )));
        }

        // Route whisper.cpp output through our logging instead of stderr.
        LOGGING_HOOKS_INSTALLED.call_once(|| {
            install_logging_hooks();
        });

        let weights = config.paths().weights;
        let model_name = weights
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("whisper")
            .to_string();
        let path = weights.to_str().ok_or_else(|| {
            TranscriptionError::ModelNotAvailable("model path is not valid UTF-8".into())
        })?;

        let context = WhisperContext::new_with_params(path, WhisperContextParameters::default())
            .model("load whisper weights")?;
        debug!(model = %model_name, "whisper context ready");

        Ok(Self {
            context: Arc::new(context),
            language: config.language,
            threads: config.threads,
            model_name,
        })
    }
}

impl SpeechRecognizer for WhisperRecognizer {
    fn sample_rate(&self) -> u32 {
        WHISPER_SAMPLE_RATE
    }

    fn name(&self) -> &str {
        &self.model_name
    }

    fn create_session(&self) -> Result<Box<dyn RecognizerSession>, TranscriptionError> {
        Ok(Box::new(WhisperSession {
            context: Arc::clone(&self.context),
            language: self.language.clone(),
            threads: self.threads,
            audio: Vec::new(),
        }))
    }
}

struct WhisperSession {
    context: Arc<WhisperContext>,
    language: String,
    threads: Option<usize>,
    audio: Vec<f32>,
}

impl RecognizerSession for WhisperSession {
    fn accept_waveform(&mut self, samples: &[i16]) -> Result<(), TranscriptionError> {
        self.audio
            .extend(samples.iter().map(|&s| f32::from(s) / 32768.0));
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<TranscriptionResult, TranscriptionError> {
        let duration_seconds = self.audio.len() as f64 / f64::from(WHISPER_SAMPLE_RATE);

        let mut state = self.context.create_state().inference("create whisper state")?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some(&self.language));
        if let Some(threads) = self.threads {
            params.set_n_threads(threads as i32);
        }
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        let _ = state.full(params, &self.audio).inference("whisper decode")?;

        let mut text = String::new();
        let mut segments = Vec::new();
        for segment in state.as_iter() {
            let piece = segment.to_string();
            text.push_str(&piece);
            // timestamps are in centiseconds
            segments.push(Segment {
                start: segment.start_timestamp() as f64 / 100.0,
                end: segment.end_timestamp() as f64 / 100.0,
                text: piece.trim().to_string(),
            });
        }

        Ok(TranscriptionResult {
            text: text.trim().to_string(),
            language: self.language,
            duration_seconds,
            segments,
        })
    }
}
