//! Stand-in collaborators for unit tests.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use kanascribe_kana::{ConversionError, ScriptConverter};
use kanascribe_transcription::{
    MediaTranscoder, RecognizerSession, SpeechRecognizer, TranscodeError, TranscriptionError,
};
use tempfile::TempDir;

use crate::pipeline::{Pipeline, PipelineOptions};

/// Fails every fetch.
pub(crate) struct Unreachable;

#[async_trait]
impl MediaTranscoder for Unreachable {
    async fn transcode(&self, _url: &str, _dest: &Path) -> Result<(), TranscodeError> {
        Err(TranscodeError::Failed("host unreachable".into()))
    }
}

/// Never finishes a fetch.
pub(crate) struct Hanging;

#[async_trait]
impl MediaTranscoder for Hanging {
    async fn transcode(&self, _url: &str, _dest: &Path) -> Result<(), TranscodeError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

/// Recognizer without a model; converter that echoes.
pub(crate) struct NoModel;

impl SpeechRecognizer for NoModel {
    fn sample_rate(&self) -> u32 {
        16_000
    }
    fn name(&self) -> &str {
        "none"
    }
    fn create_session(&self) -> Result<Box<dyn RecognizerSession>, TranscriptionError> {
        Err(TranscriptionError::ModelNotAvailable("none".into()))
    }
}

#[async_trait]
impl ScriptConverter for NoModel {
    async fn convert(&self, text: &str) -> Result<String, ConversionError> {
        Ok(text.to_owned())
    }
}

fn pipeline_with(transcoder: Arc<dyn MediaTranscoder>) -> (Pipeline, TempDir) {
    let scratch = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(
        transcoder,
        Arc::new(NoModel),
        Arc::new(NoModel),
        PipelineOptions {
            scratch_dir: scratch.path().to_path_buf(),
            url_template: "https://files.test/{fileId}".into(),
            chunk_samples: 4000,
        },
    );
    (pipeline, scratch)
}

/// Pipeline whose every request fails at fetch.
pub(crate) fn unreachable_pipeline() -> (Pipeline, TempDir) {
    pipeline_with(Arc::new(Unreachable))
}

/// Pipeline whose every request hangs at fetch.
pub(crate) fn hanging_pipeline() -> (Pipeline, TempDir) {
    pipeline_with(Arc::new(Hanging))
}
