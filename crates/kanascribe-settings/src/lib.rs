//! # kanascribe-settings
//!
//! Configuration management with layered sources.
//!
//! Settings are loaded from four layers (in priority order):
//! 1. **Compiled defaults**: [`KanascribeSettings::default()`]
//! 2. **Settings file**: `./kanascribe.json` or `$KANASCRIBE_CONFIG` (deep-merged over defaults)
//! 3. **Environment variables**: `PORT` and `KANASCRIBE_*` overrides
//! 4. **CLI flags**: applied by the binary after loading
//!
//! There is no global instance: the binary loads settings once and hands each
//! component its group.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;
