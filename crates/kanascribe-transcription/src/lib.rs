//! Waveform reading, recognizer sessions and media transcoding.
//!
//! # Architecture
//!
//! ```text
//! source URL → ffmpeg → mono 16-bit PCM WAV (scratch file)
//! → WaveformReader (header check, then chunks) → RecognizerSession
//! → finish() → TranscriptionResult
//! ```
//!
//! ## Crate Position
//!
//! Standalone (no kanascribe crate dependencies).
//! Depended on by: kanascribe-server, kanascribe.

// Always available (no heavy deps)
pub mod model;
pub mod recognizer;
pub mod transcode;
pub mod types;
pub mod waveform;

// Feature-gated (requires whisper.cpp build toolchain)
#[cfg(feature = "whisper")]
pub mod whisper;

pub use model::{RecognizerConfig, load_recognizer};
pub use recognizer::{RecognizerSession, SpeechRecognizer, transcribe_file, transcribe_waveform};
pub use transcode::{FfmpegTranscoder, MediaTranscoder, TranscodeError};
pub use types::{ResultExt, Segment, TranscriptionError, TranscriptionResult};
pub use waveform::{
    AudioFormat, FormatError, WaveformContract, WaveformFormatDescriptor, WaveformReader,
};
