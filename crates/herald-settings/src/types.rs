//! Settings type definitions.
//!
//! All types use camelCase JSON names and `#[serde(default)]`, so a partial
//! settings file only needs the keys it changes.

use herald_logging::{LogFormat, LogLevel};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Largest accepted `hub.clientQueueCapacity`.
pub const MAX_CLIENT_QUEUE_CAPACITY: usize = 4096;
/// Largest accepted `hub.eventBuffer`.
pub const MAX_EVENT_BUFFER: usize = 65_536;
/// Shortest accepted `heartbeat.intervalMs` while the heartbeat is enabled.
pub const MIN_HEARTBEAT_INTERVAL_MS: u64 = 10;
/// Longest accepted `heartbeat.intervalMs` (one hour).
pub const MAX_HEARTBEAT_INTERVAL_MS: u64 = 3_600_000;

/// Root settings type.
///
/// ```json
/// {
///   "server": { "port": 8080 },
///   "heartbeat": { "intervalMs": 10000 }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeraldSettings {
    /// HTTP listener settings.
    pub server: ServerSettings,
    /// Broadcast hub sizing.
    pub hub: HubSettings,
    /// Periodic synthetic notification.
    pub heartbeat: HeartbeatSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

impl HeraldSettings {
    /// Reject values the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(SettingsError::InvalidValue("server.host must not be empty".into()));
        }
        if self.server.max_body_bytes == 0 {
            return Err(SettingsError::InvalidValue(
                "server.maxBodyBytes must be greater than zero".into(),
            ));
        }
        if !(1..=MAX_CLIENT_QUEUE_CAPACITY).contains(&self.hub.client_queue_capacity) {
            return Err(SettingsError::InvalidValue(format!(
                "hub.clientQueueCapacity must be between 1 and {MAX_CLIENT_QUEUE_CAPACITY}"
            )));
        }
        if !(1..=MAX_EVENT_BUFFER).contains(&self.hub.event_buffer) {
            return Err(SettingsError::InvalidValue(format!(
                "hub.eventBuffer must be between 1 and {MAX_EVENT_BUFFER}"
            )));
        }
        if self.heartbeat.enabled
            && !(MIN_HEARTBEAT_INTERVAL_MS..=MAX_HEARTBEAT_INTERVAL_MS)
                .contains(&self.heartbeat.interval_ms)
        {
            return Err(SettingsError::InvalidValue(format!(
                "heartbeat.intervalMs must be between {MIN_HEARTBEAT_INTERVAL_MS} and {MAX_HEARTBEAT_INTERVAL_MS}"
            )));
        }
        Ok(())
    }
}

/// HTTP listener settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Directory served for unmatched GET paths.
    pub static_dir: String,
    /// Largest accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            static_dir: "static".to_string(),
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Broadcast hub sizing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HubSettings {
    /// Per-client outbound queue capacity. A client whose queue is full when
    /// a notification arrives is dropped.
    pub client_queue_capacity: usize,
    /// Capacity of the hub's inbound event queue.
    pub event_buffer: usize,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            client_queue_capacity: 8,
            event_buffer: 256,
        }
    }
}

/// Periodic synthetic notification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeartbeatSettings {
    /// Whether the heartbeat producer runs.
    pub enabled: bool,
    /// Interval between heartbeats in milliseconds.
    pub interval_ms: u64,
}

impl Default for HeartbeatSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 5_000,
        }
    }
}

/// Log output.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level (overridden by `RUST_LOG`).
    pub level: LogLevel,
    /// `pretty` or `json`.
    pub format: LogFormat,
}
