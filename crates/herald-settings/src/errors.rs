//! Settings error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file exists but could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The settings file is not valid JSON.
    #[error("{} is not valid JSON: {source}", path.display())]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },
    /// The merged document does not fit the settings schema.
    #[error("settings have the wrong shape: {0}")]
    Shape(#[from] serde_json::Error),
    /// A value is out of range or otherwise unusable.
    #[error("invalid settings value: {0}")]
    InvalidValue(String),
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_error_names_file() {
        let err = SettingsError::Read {
            path: PathBuf::from("/etc/herald.json"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().starts_with("cannot read /etc/herald.json"));
    }

    #[test]
    fn parse_error_names_file() {
        let source = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = SettingsError::Parse {
            path: PathBuf::from("herald.json"),
            source,
        };
        assert!(err.to_string().starts_with("herald.json is not valid JSON"));
    }

    #[test]
    fn invalid_value_display() {
        let err = SettingsError::InvalidValue("hub.eventBuffer must be at least 1".into());
        assert_eq!(
            err.to_string(),
            "invalid settings value: hub.eventBuffer must be at least 1"
        );
    }
}
