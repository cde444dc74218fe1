//! Kanji → kana conversion.
//!
//! A compiled morphological dictionary supplies per-morpheme readings;
//! [`script`] renders them in the configured syllabary.
//!
//! ## Crate Position
//!
//! Depends on: kanascribe-settings.
//! Depended on by: kanascribe-server, kanascribe.

pub mod analyzer;
pub mod converter;
pub mod errors;
pub mod script;

pub use analyzer::KanaAnalyzer;
pub use converter::{AnalyzerConverter, ScriptConverter, load_converter};
pub use errors::ConversionError;
pub use script::{hiragana_to_katakana, katakana_to_hiragana, render};
