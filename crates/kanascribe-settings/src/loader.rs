//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`KanascribeSettings::default()`]
//! 2. If the settings file exists, deep-merge its values over the defaults
//! 3. Apply environment variable overrides (highest priority)
//! 4. Validate
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::{KanascribeSettings, KanaTarget, LogFormat};

/// Env var naming an alternative settings file.
pub const CONFIG_ENV: &str = "KANASCRIBE_CONFIG";

/// Resolve the settings file path: `KANASCRIBE_CONFIG`, else `./kanascribe.json`.
pub fn settings_path() -> PathBuf {
    read_env_string(CONFIG_ENV).map_or_else(|| PathBuf::from("kanascribe.json"), PathBuf::from)
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<KanascribeSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. Invalid JSON or a settings
/// combination rejected by [`KanascribeSettings::validate`] is an error.
pub fn load_settings_from_path(path: &Path) -> Result<KanascribeSettings> {
    load_settings_with_env(path, |name| std::env::var(name).ok())
}

/// Like [`load_settings_from_path`] but with an injectable environment.
pub fn load_settings_with_env(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<KanascribeSettings> {
    let defaults = serde_json::to_value(KanascribeSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: KanascribeSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings, env);
    settings.validate()?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Empty values are treated as unset. Values that fail to parse or fall
/// outside their range are ignored with a warning.
pub fn apply_env_overrides(settings: &mut KanascribeSettings, env: impl Fn(&str) -> Option<String>) {
    let env = |name: &str| env(name).filter(|v| !v.is_empty());

    // ── Server ──────────────────────────────────────────────────────
    if let Some(v) = env("PORT").and_then(|v| checked("PORT", &v, parse_u16_range(&v, 1, 65535))) {
        settings.server.port = v;
    }
    if let Some(v) = env("KANASCRIBE_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = env("KANASCRIBE_SCRATCH_DIR") {
        settings.server.scratch_dir = Some(PathBuf::from(v));
    }

    // ── Pipeline collaborators ──────────────────────────────────────
    if let Some(v) = env("KANASCRIBE_SOURCE_URL") {
        settings.source.url_template = v;
    }
    if let Some(v) = env("KANASCRIBE_FFMPEG") {
        settings.transcode.ffmpeg_path = v;
    }
    if let Some(v) = env("KANASCRIBE_MODEL_DIR") {
        settings.recognition.model_dir = PathBuf::from(v);
    }
    if let Some(v) = env("KANASCRIBE_SAMPLE_RATE").and_then(|v| {
        checked(
            "KANASCRIBE_SAMPLE_RATE",
            &v,
            parse_u32_range(&v, 8_000, 192_000),
        )
    }) {
        settings.recognition.sample_rate = v;
    }
    if let Some(v) = env("KANASCRIBE_LANGUAGE") {
        settings.recognition.language = v;
    }
    if let Some(v) = env("KANASCRIBE_DICTIONARY") {
        settings.kana.dictionary_path = PathBuf::from(v);
    }
    if let Some(v) = env("KANASCRIBE_KANA_TARGET") {
        if let Some(target) = checked("KANASCRIBE_KANA_TARGET", &v, parse_enum::<KanaTarget>(&v)) {
            settings.kana.target = target;
        }
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = env("KANASCRIBE_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = env("KANASCRIBE_LOG_FORMAT") {
        if let Some(format) = checked("KANASCRIBE_LOG_FORMAT", &v, parse_enum::<LogFormat>(&v)) {
            settings.logging.format = format;
        }
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

/// Parse a lowercase serde enum tag (`"katakana"`, `"json"`, ...).
fn parse_enum<T: serde::de::DeserializeOwned>(val: &str) -> Option<T> {
    serde_json::from_value(Value::String(val.to_lowercase())).ok()
}

fn checked<T>(key: &str, raw: &str, parsed: Option<T>) -> Option<T> {
    if parsed.is_none() {
        tracing::warn!(key, value = %raw, "invalid env var, ignoring");
    }
    parsed
}

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
