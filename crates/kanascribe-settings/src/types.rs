//! Settings types.
//!
//! Every group deserializes with `#[serde(default)]` so a partial settings
//! file only needs the keys it overrides.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Placeholder substituted with the percent-encoded file id.
pub const FILE_ID_PLACEHOLDER: &str = "{fileId}";

/// Root settings object.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KanascribeSettings {
    /// HTTP listener and scratch storage.
    pub server: ServerSettings,
    /// Remote file host resolution.
    pub source: SourceSettings,
    /// External transcoder.
    pub transcode: TranscodeSettings,
    /// Speech recognition model.
    pub recognition: RecognitionSettings,
    /// Kana conversion analyzer.
    pub kana: KanaSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

impl KanascribeSettings {
    /// Reject values that would make every request fail.
    pub fn validate(&self) -> Result<()> {
        if self.recognition.sample_rate == 0 {
            return Err(SettingsError::InvalidValue(
                "recognition.sampleRate must be greater than zero".into(),
            ));
        }
        if self.recognition.chunk_samples == 0 {
            return Err(SettingsError::InvalidValue(
                "recognition.chunkSamples must be greater than zero".into(),
            ));
        }
        if !self.source.url_template.contains(FILE_ID_PLACEHOLDER) {
            return Err(SettingsError::InvalidValue(format!(
                "source.urlTemplate must contain {FILE_ID_PLACEHOLDER}"
            )));
        }
        Ok(())
    }
}

/// HTTP listener settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Listening port.
    pub port: u16,
    /// Directory for per-request waveform files. `None` uses the OS temp dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<PathBuf>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3333,
            scratch_dir: None,
        }
    }
}

impl ServerSettings {
    /// Resolved scratch directory.
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("kanascribe"))
    }
}

/// Remote file host settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceSettings {
    /// URL template; `{fileId}` is replaced with the encoded request id.
    pub url_template: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            url_template: "https://drive.google.com/uc?export=download&id={fileId}".to_string(),
        }
    }
}

/// Transcoder settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscodeSettings {
    /// `ffmpeg` executable (name on `PATH` or absolute path).
    pub ffmpeg_path: String,
}

impl Default for TranscodeSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
        }
    }
}

/// Speech recognition settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecognitionSettings {
    /// Directory holding the model weights.
    pub model_dir: PathBuf,
    /// Weights file name inside `model_dir`.
    pub model_file: String,
    /// Sample rate every waveform must have.
    pub sample_rate: u32,
    /// Spoken language code passed to the recognizer.
    pub language: String,
    /// Inference threads (`None` = backend default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
    /// Samples per chunk handed from the reader to the recognizer.
    pub chunk_samples: usize,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("model"),
            model_file: "ggml-model.bin".to_string(),
            sample_rate: 16_000,
            language: "ja".to_string(),
            threads: None,
            chunk_samples: 4000,
        }
    }
}

/// Phonetic script produced by the converter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KanaTarget {
    /// ひらがな.
    #[default]
    Hiragana,
    /// カタカナ.
    Katakana,
}

/// Kana conversion settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KanaSettings {
    /// Compiled analyzer dictionary (`.dic`, or zstd-compressed `.dic.zst`).
    pub dictionary_path: PathBuf,
    /// Zero-based feature column holding the reading (7 for IPADIC).
    pub reading_field: usize,
    /// Output script.
    pub target: KanaTarget,
}

impl Default for KanaSettings {
    fn default() -> Self {
        Self {
            dictionary_path: PathBuf::from("dict/system.dic.zst"),
            reading_field: 7,
            target: KanaTarget::Hiragana,
        }
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line human readable.
    #[default]
    Compact,
    /// Newline-delimited JSON.
    Json,
}

/// Logging settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}
