//! # herald-settings
//!
//! Configuration with layered sources.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`HeraldSettings::default()`]
//! 2. **Settings file**: `herald.json` (deep-merged over defaults)
//! 3. **Environment variables**: `HERALD_*` overrides (highest priority)
//!
//! The result is validated before it is returned.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, deep_merge, load_settings_from_path, load_settings_with_env,
    settings_path,
};
pub use types::*;
