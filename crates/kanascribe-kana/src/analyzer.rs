//! Dictionary-backed morphological analyzer.
//!
//! The compiled dictionary is loaded once and shared read-only; every call
//! to [`KanaAnalyzer::reading`] creates its own tokenizer worker.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::{debug, info};
use vibrato::{Dictionary, Tokenizer};

use crate::errors::ConversionError;

/// Placeholder some dictionaries use for "no value".
const EMPTY_FEATURE: &str = "*";

/// Shared analyzer.
pub struct KanaAnalyzer {
    tokenizer: Tokenizer,
    reading_field: usize,
}

impl KanaAnalyzer {
    /// Load a compiled dictionary. Paths ending in `.zst` are decompressed.
    ///
    /// Blocking and slow for full-size dictionaries; call once at startup.
    pub fn load(path: &Path, reading_field: usize) -> Result<Self, ConversionError> {
        if !path.is_file() {
            return Err(ConversionError::Dictionary(format!(
                "{} not found",
                path.display()
            )));
        }
        info!(path = %path.display(), "loading analyzer dictionary");

        let file = File::open(path)
            .map_err(|e| ConversionError::Dictionary(format!("{}: {e}", path.display())))?;
        let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "zst") {
            Box::new(
                zstd::Decoder::new(file)
                    .map_err(|e| ConversionError::Dictionary(format!("zstd: {e}")))?,
            )
        } else {
            Box::new(BufReader::new(file))
        };
        let dict = Dictionary::read(reader)
            .map_err(|e| ConversionError::Dictionary(format!("{}: {e}", path.display())))?;

        Ok(Self::from_dictionary(dict, reading_field))
    }

    /// Wrap an already-built dictionary.
    pub fn from_dictionary(dict: Dictionary, reading_field: usize) -> Self {
        Self {
            tokenizer: Tokenizer::new(dict),
            reading_field,
        }
    }

    /// Replace each morpheme of `text` by its dictionary reading.
    pub fn reading(&self, text: &str) -> String {
        let mut worker = self.tokenizer.new_worker();
        worker.reset_sentence(text);
        worker.tokenize();
        debug!(tokens = worker.num_tokens(), "analyzed text");

        let mut out = String::with_capacity(text.len() * 2);
        for token in worker.token_iter() {
            out.push_str(token_reading(token.surface(), token.feature(), self.reading_field));
        }
        out
    }
}

/// Reading column of a comma-separated feature string, or `surface` when
/// the column is missing, empty or `*`.
pub fn token_reading<'a>(surface: &'a str, feature: &'a str, reading_field: usize) -> &'a str {
    feature
        .split(',')
        .nth(reading_field)
        .map(str::trim)
        .filter(|r| !r.is_empty() && *r != EMPTY_FEATURE)
        .unwrap_or(surface)
}
