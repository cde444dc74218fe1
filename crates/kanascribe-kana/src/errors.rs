//! Kana conversion errors.

/// Failures of the kanji → kana stage.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// The analyzer dictionary is missing or unreadable.
    #[error("dictionary error: {0}")]
    Dictionary(String),

    /// Analysis of a text failed.
    #[error("kana conversion failed: {0}")]
    Analysis(String),
}
