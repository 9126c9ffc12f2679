//! # herald-logging
//!
//! Structured logging for herald, built on `tracing`.
//!
//! - [`LogLevel`] / [`LogFormat`] / [`LoggingConfig`] describe the subscriber
//! - [`init_subscriber`] installs the global stderr subscriber
//! - [`test_utils::capture_logs`] records events in memory for assertions

#![deny(unsafe_code)]

pub mod test_utils;
pub mod types;

pub use test_utils::{CapturedEvent, CapturedLogs, capture_logs};
pub use types::{LogFormat, LogLevel, LoggingConfig};

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// A global subscriber is already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Build the level filter. `RUST_LOG` takes precedence over `level`.
pub fn build_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter_str()))
}

/// Install the global tracing subscriber writing to stderr.
///
/// Call once at startup. A second call fails with [`LoggingError::Init`].
pub fn init_subscriber(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = build_filter(config.level);

    let (pretty, json) = match config.format {
        LogFormat::Pretty => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            ),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            ),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json)
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_exports_work() {
        let _level = LogLevel::Info;
        let _config = LoggingConfig::default();
    }

    #[test]
    fn second_init_fails() {
        let config = LoggingConfig::default();
        // The first call may succeed or fail depending on test ordering; the
        // second one can never succeed.
        let _ = init_subscriber(&config);
        assert!(init_subscriber(&config).is_err());
    }

    #[test]
    fn build_filter_does_not_panic() {
        let _filter = build_filter(LogLevel::Debug);
    }
}
