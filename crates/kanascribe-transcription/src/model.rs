//! Model path resolution and one-shot recognizer loading.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::recognizer::SpeechRecognizer;
use crate::types::{ResultExt, TranscriptionError};

/// Everything needed to load the recognition model.
#[derive(Debug, Clone)]
pub struct RecognizerConfig {
    /// Directory holding the weights.
    pub model_dir: PathBuf,
    /// Weights file name inside `model_dir`.
    pub model_file: String,
    /// Sample rate sessions must be fed at.
    pub sample_rate: u32,
    /// Language code to decode with.
    pub language: String,
    /// Inference threads (`None` = backend default).
    pub threads: Option<usize>,
}

impl RecognizerConfig {
    /// Typed paths for this config.
    pub fn paths(&self) -> ModelPaths {
        ModelPaths::from_dir(&self.model_dir, &self.model_file)
    }
}

/// Typed paths for the model files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPaths {
    /// Model directory.
    pub dir: PathBuf,
    /// Weights file (`ggml` format).
    pub weights: PathBuf,
}

impl ModelPaths {
    /// Construct paths for the model under `dir`.
    pub fn from_dir(dir: impl AsRef<Path>, weights_file: &str) -> Self {
        let dir = dir.as_ref();
        Self {
            dir: dir.to_path_buf(),
            weights: dir.join(weights_file),
        }
    }

    /// Fail with a descriptive error unless the directory and weights exist.
    pub fn ensure_present(&self) -> Result<(), TranscriptionError> {
        if !self.dir.is_dir() {
            return Err(TranscriptionError::ModelNotAvailable(format!(
                "model directory {} does not exist",
                self.dir.display()
            )));
        }
        if !self.weights.is_file() {
            return Err(TranscriptionError::ModelNotAvailable(format!(
                "model weights {} not found",
                self.weights.display()
            )));
        }
        Ok(())
    }
}

/// Load the recognizer described by `config` on the blocking pool.
///
/// Called once at startup. Without the `whisper` feature there is no
/// backend and this always fails after the path checks.
pub async fn load_recognizer(
    config: RecognizerConfig,
) -> Result<Arc<dyn SpeechRecognizer>, TranscriptionError> {
    config.paths().ensure_present()?;
    info!(
        dir = %config.model_dir.display(),
        sample_rate = config.sample_rate,
        language = %config.language,
        "loading recognition model"
    );
    tokio::task::spawn_blocking(move || load_backend(config))
        .await
        .model("model load task")?
}

#[cfg(feature = "whisper")]
fn load_backend(config: RecognizerConfig) -> Result<Arc<dyn SpeechRecognizer>, TranscriptionError> {
    let recognizer = crate::whisper::WhisperRecognizer::load(config)?;
    Ok(Arc::new(recognizer))
}

#[cfg(not(feature = "whisper"))]
fn load_backend(_config: RecognizerConfig) -> Result<Arc<dyn SpeechRecognizer>, TranscriptionError> {
    Err(TranscriptionError::ModelNotAvailable(
        "built without a recognizer backend; rebuild with `--features whisper`".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &Path) -> RecognizerConfig {
        RecognizerConfig {
            model_dir: dir.to_path_buf(),
            model_file: "ggml-model.bin".into(),
            sample_rate: 16_000,
            language: "ja".into(),
            threads: None,
        }
    }

    #[test]
    fn paths_from_dir() {
        let paths = ModelPaths::from_dir("/models/ja", "ggml-small.bin");
        assert_eq!(paths.dir, PathBuf::from("/models/ja"));
        assert_eq!(paths.weights, PathBuf::from("/models/ja/ggml-small.bin"));
    }

    #[test]
    fn missing_dir_is_reported() {
        let err = ModelPaths::from_dir("/nonexistent/model", "w.bin")
            .ensure_present()
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/model"));
    }

    #[test]
    fn missing_weights_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let err = ModelPaths::from_dir(tmp.path(), "w.bin")
            .ensure_present()
            .unwrap_err();
        assert!(matches!(err, TranscriptionError::ModelNotAvailable(m) if m.contains("w.bin")));
    }

    #[test]
    fn present_files_pass() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("w.bin"), b"").unwrap();
        assert!(ModelPaths::from_dir(tmp.path(), "w.bin").ensure_present().is_ok());
    }

    #[tokio::test]
    async fn load_fails_fast_on_missing_model() {
        let result = load_recognizer(config(Path::new("/nonexistent/model"))).await;
        assert!(matches!(result, Err(TranscriptionError::ModelNotAvailable(_))));
    }

    #[cfg(not(feature = "whisper"))]
    #[tokio::test]
    async fn load_without_backend_fails() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("ggml-model.bin"), b"").unwrap();
        let result = load_recognizer(config(tmp.path())).await;
        assert!(matches!(result, Err(TranscriptionError::ModelNotAvailable(m)) if m.contains("whisper")));
    }
}
