//! Kanji → kana conversion behind an async seam.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use kanascribe_settings::{KanaSettings, KanaTarget};
use tracing::info;

use crate::analyzer::KanaAnalyzer;
use crate::errors::ConversionError;
use crate::script::render;

/// Converts mixed-script Japanese text into a phonetic kana rendering.
#[async_trait]
pub trait ScriptConverter: Send + Sync {
    /// Convert `text`. Implementations may block internally but must not
    /// block the calling task.
    async fn convert(&self, text: &str) -> Result<String, ConversionError>;
}

/// [`ScriptConverter`] backed by a shared [`KanaAnalyzer`].
#[derive(Clone)]
pub struct AnalyzerConverter {
    analyzer: Arc<KanaAnalyzer>,
    target: KanaTarget,
}

impl AnalyzerConverter {
    /// Render analyzer readings in `target`.
    pub fn new(analyzer: Arc<KanaAnalyzer>, target: KanaTarget) -> Self {
        Self { analyzer, target }
    }

    /// Target syllabary.
    pub fn target(&self) -> KanaTarget {
        self.target
    }
}

#[async_trait]
impl ScriptConverter for AnalyzerConverter {
    async fn convert(&self, text: &str) -> Result<String, ConversionError> {
        let analyzer = Arc::clone(&self.analyzer);
        let target = self.target;
        let text = text.to_owned();
        tokio::task::spawn_blocking(move || render(&analyzer.reading(&text), target))
            .await
            .map_err(|e| ConversionError::Analysis(format!("task join: {e}")))
    }
}

/// Load the analyzer described by `settings` off the async runtime.
pub async fn load_converter(settings: &KanaSettings) -> Result<AnalyzerConverter, ConversionError> {
    let path: PathBuf = settings.dictionary_path.clone();
    let reading_field = settings.reading_field;
    let analyzer = tokio::task::spawn_blocking(move || KanaAnalyzer::load(&path, reading_field))
        .await
        .map_err(|e| ConversionError::Dictionary(format!("task join: {e}")))??;
    info!(target = ?settings.target, "kana converter ready");
    Ok(AnalyzerConverter::new(Arc::new(analyzer), settings.target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::tests::tiny_analyzer;

    fn converter(target: KanaTarget) -> AnalyzerConverter {
        AnalyzerConverter::new(Arc::new(tiny_analyzer()), target)
    }

    #[tokio::test]
    async fn converts_to_hiragana() {
        let out = converter(KanaTarget::Hiragana)
            .convert("今日は天気")
            .await
            .unwrap();
        assert_eq!(out, "きょうはてんき");
    }

    #[tokio::test]
    async fn converts_to_katakana() {
        let out = converter(KanaTarget::Katakana)
            .convert("今日は天気")
            .await
            .unwrap();
        assert_eq!(out, "キョウハテンキ");
    }

    #[tokio::test]
    async fn unknown_text_passes_through() {
        let out = converter(KanaTarget::Hiragana).convert("OK").await.unwrap();
        assert_eq!(out, "OK");
    }

    #[tokio::test]
    async fn concurrent_conversions_share_analyzer() {
        let c = converter(KanaTarget::Hiragana);
        let (a, b) = tokio::join!(c.convert("今日は"), c.convert("こんにちは"));
        assert_eq!(a.unwrap(), "きょうは");
        assert_eq!(b.unwrap(), "こんにちは");
    }

    #[tokio::test]
    async fn load_converter_missing_dictionary() {
        let settings = KanaSettings {
            dictionary_path: "/nonexistent/system.dic.zst".into(),
            ..KanaSettings::default()
        };
        let err = load_converter(&settings).await.err().unwrap();
        assert!(matches!(err, ConversionError::Dictionary(_)));
    }
}
