//! Core types for transcription.

use serde::Serialize;

use crate::waveform::FormatError;

/// Result of transcribing one waveform.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionResult {
    /// The recognized text, trimmed.
    pub text: String,
    /// Language code the recognizer decoded with (e.g. "ja").
    pub language: String,
    /// Duration of the consumed audio in seconds.
    pub duration_seconds: f64,
    /// Timed segments as reported by the recognizer.
    pub segments: Vec<Segment>,
}

/// One timed span of recognized text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    /// Start offset in seconds.
    pub start: f64,
    /// End offset in seconds.
    pub end: f64,
    /// Segment text.
    pub text: String,
}

/// Errors that can occur during transcription.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    /// Model files not found or failed to load.
    #[error("model not available: {0}")]
    ModelNotAvailable(String),

    /// Waveform header did not meet the recognizer contract, or was unreadable.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Session creation, decoding or finalization failure.
    #[error("inference error: {0}")]
    Inference(String),

    /// I/O error (file read/write).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Extension trait to reduce `.map_err()` boilerplate when wrapping errors into `TranscriptionError`.
pub trait ResultExt<T> {
    /// Wrap the error as [`TranscriptionError::Inference`] with `context` prefix.
    fn inference(self, context: &str) -> Result<T, TranscriptionError>;
    /// Wrap the error as [`TranscriptionError::ModelNotAvailable`] with `context` prefix.
    fn model(self, context: &str) -> Result<T, TranscriptionError>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn inference(self, context: &str) -> Result<T, TranscriptionError> {
        self.map_err(|e| TranscriptionError::Inference(format!("{context}: {e}")))
    }
    fn model(self, context: &str) -> Result<T, TranscriptionError> {
        self.map_err(|e| TranscriptionError::ModelNotAvailable(format!("{context}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_serializes_camel_case() {
        let r = TranscriptionResult {
            text: "こんにちは".into(),
            language: "ja".into(),
            duration_seconds: 1.5,
            segments: vec![Segment {
                start: 0.0,
                end: 1.5,
                text: "こんにちは".into(),
            }],
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["text"], "こんにちは");
        assert_eq!(json["durationSeconds"], 1.5);
        assert_eq!(json["segments"][0]["end"], 1.5);
    }

    #[test]
    fn transcription_error_display() {
        let e = TranscriptionError::ModelNotAvailable("missing weights".into());
        assert!(e.to_string().contains("missing weights"));

        let e = TranscriptionError::Format(FormatError::Unreadable("bad RIFF".into()));
        assert!(e.to_string().contains("bad RIFF"));
    }

    #[test]
    fn result_ext_inference_context() {
        let err: Result<(), &str> = Err("state alloc failed");
        let mapped = err.inference("create session");
        assert!(
            matches!(mapped, Err(TranscriptionError::Inference(s)) if s == "create session: state alloc failed")
        );
    }

    #[test]
    fn result_ext_model_context() {
        let err: Result<(), &str> = Err("no such file");
        let mapped = err.model("load weights");
        assert!(
            matches!(mapped, Err(TranscriptionError::ModelNotAvailable(s)) if s == "load weights: no such file")
        );
    }

    #[test]
    fn result_ext_ok_passthrough() {
        let ok: Result<i32, &str> = Ok(42);
        assert_eq!(ok.inference("ctx").unwrap(), 42);
    }
}
