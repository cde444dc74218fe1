//! WAV reading with up-front format validation.
//!
//! The header is checked against a [`WaveformContract`] before any sample is
//! touched; on success the reader yields fixed-size chunks of `i16` samples
//! until the data chunk is exhausted.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::debug;

/// Audio encodings a WAV header can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    /// Linear PCM integers (`WAVE_FORMAT_PCM`).
    Pcm,
    /// IEEE float (`WAVE_FORMAT_IEEE_FLOAT`).
    IeeeFloat,
}

impl AudioFormat {
    /// The RIFF `wFormatTag` value.
    pub fn code(self) -> u16 {
        match self {
            Self::Pcm => 1,
            Self::IeeeFloat => 3,
        }
    }
}

/// Format parameters read from a waveform header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveformFormatDescriptor {
    /// Sample encoding.
    pub audio_format: AudioFormat,
    /// Samples per second per channel.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
    /// Bits per sample.
    pub bits_per_sample: u16,
}

impl From<hound::WavSpec> for WaveformFormatDescriptor {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            audio_format: match spec.sample_format {
                hound::SampleFormat::Int => AudioFormat::Pcm,
                hound::SampleFormat::Float => AudioFormat::IeeeFloat,
            },
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl fmt::Display for WaveformFormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "format={} rate={}Hz channels={} bits={}",
            self.audio_format.code(),
            self.sample_rate,
            self.channels,
            self.bits_per_sample
        )
    }
}

/// The fixed format a recognizer accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveformContract {
    /// Required sample rate.
    pub sample_rate: u32,
    /// Required channel count.
    pub channels: u16,
    /// Required bit depth.
    pub bits_per_sample: u16,
}

impl WaveformContract {
    /// Mono 16-bit linear PCM at `sample_rate`.
    pub fn pcm16_mono(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            channels: 1,
            bits_per_sample: 16,
        }
    }

    /// Check a header against the contract.
    pub fn check(&self, found: &WaveformFormatDescriptor) -> Result<(), FormatError> {
        let ok = found.audio_format == AudioFormat::Pcm
            && found.sample_rate == self.sample_rate
            && found.channels == self.channels
            && found.bits_per_sample == self.bits_per_sample;
        if ok {
            Ok(())
        } else {
            Err(FormatError::Mismatch {
                expected: *self,
                found: *found,
            })
        }
    }
}

impl fmt::Display for WaveformContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "format={} rate={}Hz channels={} bits={}",
            AudioFormat::Pcm.code(),
            self.sample_rate,
            self.channels,
            self.bits_per_sample
        )
    }
}

/// Waveform errors.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// Header could not be parsed.
    #[error("unreadable waveform: {0}")]
    Unreadable(String),

    /// Header parsed but does not meet the contract.
    #[error("waveform format mismatch: expected {expected}, found {found}")]
    Mismatch {
        /// What the recognizer requires.
        expected: WaveformContract,
        /// What the header declares.
        found: WaveformFormatDescriptor,
    },

    /// Sample data ended early or was corrupt.
    #[error("failed to read waveform samples: {0}")]
    Samples(String),
}

/// Lazy, ordered, single-pass chunk reader over a validated waveform.
///
/// Iteration yields `Some(Ok(chunk))` for each chunk of up to `chunk_samples`
/// samples and `None` once the data is exhausted. After an error or the end
/// of stream it stays exhausted.
pub struct WaveformReader<R: Read> {
    inner: hound::WavReader<R>,
    format: WaveformFormatDescriptor,
    chunk_samples: usize,
    finished: bool,
}

impl WaveformReader<BufReader<File>> {
    /// Open a WAV file and validate its header.
    pub fn open(
        path: impl AsRef<Path>,
        contract: &WaveformContract,
        chunk_samples: usize,
    ) -> Result<Self, FormatError> {
        let path = path.as_ref();
        let inner = hound::WavReader::open(path)
            .map_err(|e| FormatError::Unreadable(format!("{}: {e}", path.display())))?;
        Self::validated(inner, contract, chunk_samples)
    }
}

impl<R: Read> WaveformReader<R> {
    /// Wrap any reader (used by tests and in-memory sources).
    pub fn from_reader(
        reader: R,
        contract: &WaveformContract,
        chunk_samples: usize,
    ) -> Result<Self, FormatError> {
        let inner =
            hound::WavReader::new(reader).map_err(|e| FormatError::Unreadable(e.to_string()))?;
        Self::validated(inner, contract, chunk_samples)
    }

    fn validated(
        inner: hound::WavReader<R>,
        contract: &WaveformContract,
        chunk_samples: usize,
    ) -> Result<Self, FormatError> {
        let format = WaveformFormatDescriptor::from(inner.spec());
        contract.check(&format)?;
        debug!(%format, total_samples = inner.len(), "waveform header accepted");
        Ok(Self {
            inner,
            format,
            chunk_samples: chunk_samples.max(1),
            finished: false,
        })
    }

    /// The header the reader was opened with.
    pub fn format(&self) -> WaveformFormatDescriptor {
        self.format
    }
}

impl<R: Read> Iterator for WaveformReader<R> {
    type Item = Result<Vec<i16>, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let mut chunk = Vec::with_capacity(self.chunk_samples);
        for sample in self.inner.samples::<i16>().take(self.chunk_samples) {
            match sample {
                Ok(s) => chunk.push(s),
                Err(e) => {
                    self.finished = true;
                    return Some(Err(FormatError::Samples(e.to_string())));
                }
            }
        }
        if chunk.is_empty() {
            self.finished = true;
            return None;
        }
        Some(Ok(chunk))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Cursor;

    use super::*;

    /// Encode `samples` as an in-memory WAV with the given spec.
    pub(crate) fn wav_bytes(spec: hound::WavSpec, samples: &[i16]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    pub(crate) fn mono16(sample_rate: u32) -> hound::WavSpec {
        hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        }
    }

    #[test]
    fn yields_all_samples_in_order() {
        let samples: Vec<i16> = (0..10).collect();
        let bytes = wav_bytes(mono16(16_000), &samples);
        let reader =
            WaveformReader::from_reader(Cursor::new(bytes), &WaveformContract::pcm16_mono(16_000), 4)
                .unwrap();

        let chunks: Vec<Vec<i16>> = reader.map(Result::unwrap).collect();
        assert_eq!(chunks, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7], vec![8, 9]]);
    }

    #[test]
    fn stays_exhausted_after_end() {
        let bytes = wav_bytes(mono16(16_000), &[1, 2]);
        let mut reader =
            WaveformReader::from_reader(Cursor::new(bytes), &WaveformContract::pcm16_mono(16_000), 8)
                .unwrap();
        assert_eq!(reader.next().unwrap().unwrap(), vec![1, 2]);
        assert!(reader.next().is_none());
        assert!(reader.next().is_none());
    }

    #[test]
    fn empty_data_chunk_is_immediately_exhausted() {
        let bytes = wav_bytes(mono16(16_000), &[]);
        let mut reader =
            WaveformReader::from_reader(Cursor::new(bytes), &WaveformContract::pcm16_mono(16_000), 8)
                .unwrap();
        assert!(reader.next().is_none());
    }

    #[test]
    fn rejects_wrong_sample_rate() {
        let bytes = wav_bytes(mono16(44_100), &[0; 16]);
        let result =
            WaveformReader::from_reader(Cursor::new(bytes), &WaveformContract::pcm16_mono(16_000), 8);
        let err = result.err().unwrap();
        assert!(matches!(err, FormatError::Mismatch { found, .. } if found.sample_rate == 44_100));
        let msg = err.to_string();
        assert!(msg.contains("44100"), "{msg}");
        assert!(msg.contains("16000"), "{msg}");
    }

    #[test]
    fn rejects_stereo() {
        let spec = hound::WavSpec {
            channels: 2,
            ..mono16(16_000)
        };
        let bytes = wav_bytes(spec, &[0; 16]);
        let result =
            WaveformReader::from_reader(Cursor::new(bytes), &WaveformContract::pcm16_mono(16_000), 8);
        assert!(matches!(result, Err(FormatError::Mismatch { .. })));
    }

    #[test]
    fn rejects_float_encoding() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            writer.write_sample(0.5_f32).unwrap();
            writer.finalize().unwrap();
        }
        let result = WaveformReader::from_reader(
            Cursor::new(cursor.into_inner()),
            &WaveformContract::pcm16_mono(16_000),
            8,
        );
        let err = result.err().unwrap();
        assert!(
            matches!(err, FormatError::Mismatch { found, .. } if found.audio_format == AudioFormat::IeeeFloat)
        );
    }

    #[test]
    fn rejects_garbage() {
        let result = WaveformReader::from_reader(
            Cursor::new(b"definitely not RIFF".to_vec()),
            &WaveformContract::pcm16_mono(16_000),
            8,
        );
        assert!(matches!(result, Err(FormatError::Unreadable(_))));
    }

    #[test]
    fn open_missing_file_is_unreadable() {
        let result = WaveformReader::open(
            "/nonexistent/clip.wav",
            &WaveformContract::pcm16_mono(16_000),
            8,
        );
        assert!(matches!(result, Err(FormatError::Unreadable(m)) if m.contains("clip.wav")));
    }

    #[test]
    fn open_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        std::fs::write(&path, wav_bytes(mono16(16_000), &[7; 5])).unwrap();

        let reader = WaveformReader::open(&path, &WaveformContract::pcm16_mono(16_000), 2).unwrap();
        assert_eq!(reader.format().audio_format.code(), 1);
        assert_eq!(reader.count(), 3);
    }

    #[test]
    fn audio_format_codes() {
        assert_eq!(AudioFormat::Pcm.code(), 1);
        assert_eq!(AudioFormat::IeeeFloat.code(), 3);
    }
}
