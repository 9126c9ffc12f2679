//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`HeraldSettings::default()`]
//! 2. If the settings file exists, deep-merge its values over the defaults
//! 3. Apply `HERALD_*` environment variable overrides (highest priority)
//! 4. Validate

use std::path::{Path, PathBuf};

use herald_logging::{LogFormat, LogLevel};
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{Result, SettingsError};
use crate::types::{
    HeraldSettings, MAX_CLIENT_QUEUE_CAPACITY, MAX_HEARTBEAT_INTERVAL_MS, MIN_HEARTBEAT_INTERVAL_MS,
};

/// Default settings file, relative to the working directory.
pub fn settings_path() -> PathBuf {
    PathBuf::from("herald.json")
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults; invalid JSON or invalid values are errors.
pub fn load_settings_from_path(path: &Path) -> Result<HeraldSettings> {
    load_settings_with_env(path, |name| std::env::var(name).ok())
}

/// Like [`load_settings_from_path`] but reads overrides through `env`.
pub fn load_settings_with_env<F>(path: &Path, env: F) -> Result<HeraldSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = serde_json::to_value(HeraldSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let user: Value = serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: HeraldSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings, env);
    settings.validate()?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
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

/// Apply `HERALD_*` overrides read through `env`.
///
/// Invalid values are ignored with a warning and the file/default value is kept.
pub fn apply_env_overrides<F>(settings: &mut HeraldSettings, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let read = |name: &str| env(name).filter(|v| !v.is_empty());

    if let Some(v) = read("HERALD_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = read("HERALD_PORT") {
        match parse_u16_range(&v, 0, u16::MAX) {
            Some(port) => settings.server.port = port,
            None => warn_invalid("HERALD_PORT", &v),
        }
    }
    if let Some(v) = read("HERALD_STATIC_DIR") {
        settings.server.static_dir = v;
    }
    if let Some(v) = read("HERALD_CLIENT_QUEUE_CAPACITY") {
        match parse_usize_range(&v, 1, MAX_CLIENT_QUEUE_CAPACITY) {
            Some(cap) => settings.hub.client_queue_capacity = cap,
            None => warn_invalid("HERALD_CLIENT_QUEUE_CAPACITY", &v),
        }
    }
    if let Some(v) = read("HERALD_HEARTBEAT_ENABLED") {
        match parse_bool(&v) {
            Some(enabled) => settings.heartbeat.enabled = enabled,
            None => warn_invalid("HERALD_HEARTBEAT_ENABLED", &v),
        }
    }
    if let Some(v) = read("HERALD_HEARTBEAT_INTERVAL_MS") {
        match parse_u64_range(&v, MIN_HEARTBEAT_INTERVAL_MS, MAX_HEARTBEAT_INTERVAL_MS) {
            Some(ms) => settings.heartbeat.interval_ms = ms,
            None => warn_invalid("HERALD_HEARTBEAT_INTERVAL_MS", &v),
        }
    }
    if let Some(v) = read("HERALD_LOG_LEVEL") {
        match LogLevel::parse(&v) {
            Some(level) => settings.logging.level = level,
            None => warn_invalid("HERALD_LOG_LEVEL", &v),
        }
    }
    if let Some(v) = read("HERALD_LOG_FORMAT") {
        match LogFormat::parse(&v) {
            Some(format) => settings.logging.format = format,
            None => warn_invalid("HERALD_LOG_FORMAT", &v),
        }
    }
}

fn warn_invalid(key: &str, value: &str) {
    warn!(key, value, "invalid env var, ignoring");
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}
