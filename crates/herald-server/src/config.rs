//! Server configuration.

use std::path::PathBuf;

use herald_settings::ServerSettings;

/// Configuration for the HTTP server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// Directory served for unmatched paths. `None` disables static assets.
    pub static_dir: Option<PathBuf>,
    /// Largest accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            static_dir: None,
            max_body_bytes: 64 * 1024,
        }
    }
}

impl From<&ServerSettings> for ServerConfig {
    fn from(settings: &ServerSettings) -> Self {
        let static_dir = (!settings.static_dir.is_empty()).then(|| PathBuf::from(&settings.static_dir));
        Self {
            host: settings.host.clone(),
            port: settings.port,
            static_dir,
            max_body_bytes: settings.max_body_bytes,
        }
    }
}

impl ServerConfig {
    /// `host:port` as passed to the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
