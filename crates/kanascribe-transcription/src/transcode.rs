//! Fetch + transcode via an external `ffmpeg` process.
//!
//! `ffmpeg` reads the remote URL itself and writes mono 16-bit PCM WAV at
//! the recognizer's sample rate to the destination path.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tracing::{debug, warn};

/// Bytes of stderr kept in error diagnostics.
const STDERR_TAIL: usize = 2048;

/// Transcoder failures. Every variant reads as "conversion failed".
#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    /// The transcoder could not be started.
    #[error("conversion failed: could not start {program}: {source}")]
    Spawn {
        /// Executable that failed to start.
        program: String,
        /// Underlying OS error.
        source: std::io::Error,
    },
    /// The transcoder ran and reported failure.
    #[error("conversion failed: {0}")]
    Failed(String),
}

/// Produces a normalized local waveform from a source URL.
#[async_trait]
pub trait MediaTranscoder: Send + Sync {
    /// Fetch `source_url` and write a normalized waveform to `dest`.
    async fn transcode(&self, source_url: &str, dest: &Path) -> Result<(), TranscodeError>;
}

/// [`MediaTranscoder`] backed by the `ffmpeg` CLI.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: PathBuf,
    sample_rate: u32,
}

impl FfmpegTranscoder {
    /// Use `program` (name on `PATH` or absolute path) producing `sample_rate` Hz output.
    pub fn new(program: impl Into<PathBuf>, sample_rate: u32) -> Self {
        Self {
            program: program.into(),
            sample_rate,
        }
    }

    /// Arguments for one conversion.
    pub fn args(&self, source_url: &str, dest: &Path) -> Vec<String> {
        vec![
            "-hide_banner".into(),
            "-nostdin".into(),
            "-loglevel".into(),
            "error".into(),
            "-y".into(),
            "-i".into(),
            source_url.into(),
            "-vn".into(),
            "-ac".into(),
            "1".into(),
            "-ar".into(),
            self.sample_rate.to_string(),
            "-acodec".into(),
            "pcm_s16le".into(),
            "-f".into(),
            "wav".into(),
            dest.to_string_lossy().into_owned(),
        ]
    }
}

#[async_trait]
impl MediaTranscoder for FfmpegTranscoder {
    async fn transcode(&self, source_url: &str, dest: &Path) -> Result<(), TranscodeError> {
        debug!(program = %self.program.display(), dest = %dest.display(), "starting transcoder");

        // kill_on_drop: a dropped request must not leave ffmpeg writing into
        // a scratch path that is about to be removed.
        let output = tokio::process::Command::new(&self.program)
            .args(self.args(source_url, dest))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| TranscodeError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        if output.status.success() {
            debug!(dest = %dest.display(), "transcoder finished");
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let diagnostic = tail(stderr.trim(), STDERR_TAIL);
        warn!(status = %output.status, diagnostic, "transcoder failed");
        Err(TranscodeError::Failed(if diagnostic.is_empty() {
            format!("transcoder exited with {}", output.status)
        } else {
            format!("transcoder exited with {}: {diagnostic}", output.status)
        }))
    }
}

/// Last `max` bytes of `s`, cut on a char boundary.
fn tail(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut start = s.len() - max;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_normalize_to_mono_pcm() {
        let t = FfmpegTranscoder::new("ffmpeg", 16_000);
        let args = t.args("https://host/file?id=1", Path::new("/tmp/out.wav"));
        let joined = args.join(" ");
        assert!(joined.contains("-i https://host/file?id=1"));
        assert!(joined.contains("-ac 1"));
        assert!(joined.contains("-ar 16000"));
        assert!(joined.contains("-acodec pcm_s16le"));
        assert!(joined.contains("-f wav"));
        assert_eq!(args.last().unwrap(), "/tmp/out.wav");
    }

    #[test]
    fn tail_keeps_short_strings() {
        assert_eq!(tail("short", 10), "short");
    }

    #[test]
    fn tail_respects_char_boundaries() {
        let s = "あいうえお"; // 3 bytes each
        let t = tail(s, 4);
        assert_eq!(t, "お");
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let t = FfmpegTranscoder::new("/nonexistent/bin/ffmpeg", 16_000);
        let dir = tempfile::tempdir().unwrap();
        let err = t
            .transcode("https://host/x", &dir.path().join("out.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranscodeError::Spawn { .. }));
        assert!(err.to_string().starts_with("conversion failed"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_failure() {
        // `false` ignores its arguments and exits 1.
        let t = FfmpegTranscoder::new("false", 16_000);
        let dir = tempfile::tempdir().unwrap();
        let err = t
            .transcode("https://host/x", &dir.path().join("out.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranscodeError::Failed(m) if m.contains("exited")));
    }

    #[tokio::test]
    #[ignore = "requires ffmpeg on PATH"]
    async fn real_ffmpeg_rejects_unreachable_url() {
        let t = FfmpegTranscoder::new("ffmpeg", 16_000);
        let dir = tempfile::tempdir().unwrap();
        let err = t
            .transcode("http://127.0.0.1:9/missing.mp3", &dir.path().join("out.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranscodeError::Failed(_)));
    }
}
