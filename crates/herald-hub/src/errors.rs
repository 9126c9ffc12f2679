//! Hub error types.

use thiserror::Error;

/// Errors returned by [`crate::HubHandle`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HubError {
    /// The hub loop has stopped and accepts no more events.
    #[error("notification hub is not running")]
    Closed,
}
