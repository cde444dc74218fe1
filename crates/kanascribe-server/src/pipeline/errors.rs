//! Pipeline failure taxonomy and its HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use kanascribe_kana::ConversionError;
use kanascribe_transcription::{TranscodeError, TranscriptionError};

/// Any failure that terminates a transcribe request.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// `fileId` absent or empty.
    #[error("Missing 'fileId' query parameter.")]
    MissingFileId,

    /// The query string could not be parsed (e.g. a repeated `fileId`).
    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    /// Fetch or transcode failed.
    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    /// Header check, decoding or finalization failed.
    #[error(transparent)]
    Transcription(#[from] TranscriptionError),

    /// Kana conversion failed.
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

impl PipelineError {
    /// Stage label used in logs and metrics.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::MissingFileId | Self::InvalidQuery(_) => "input",
            Self::Transcode(_) => "fetch",
            Self::Transcription(TranscriptionError::Format(_)) => "format",
            Self::Transcription(TranscriptionError::Io(_)) => "internal",
            Self::Transcription(_) => "recognition",
            Self::Conversion(_) => "conversion",
        }
    }

    /// HTTP status for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingFileId | Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
