//! Immutable notification payloads.

use std::fmt;
use std::sync::Arc;

/// A text payload fanned out to every connected client.
///
/// Cloning is cheap: every recipient shares the same allocation.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Notification {
    message: Arc<str>,
}

impl Notification {
    /// Wrap a message.
    pub fn new(message: impl Into<Arc<str>>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Synthetic liveness notification carrying sequence number `seq`.
    pub fn heartbeat(seq: u64) -> Self {
        Self::new(format!("Automatic server update #{seq}"))
    }

    /// The message text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Message length in bytes.
    pub fn len(&self) -> usize {
        self.message.len()
    }

    /// Whether the message is empty.
    pub fn is_empty(&self) -> bool {
        self.message.is_empty()
    }
}

impl fmt::Debug for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Notification").field(&&*self.message).finish()
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<String> for Notification {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for Notification {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heartbeat_text() {
        assert_eq!(Notification::heartbeat(1).message(), "Automatic server update #1");
        assert_eq!(Notification::heartbeat(42).message(), "Automatic server update #42");
    }

    #[test]
    fn clones_share_allocation() {
        let a = Notification::new("hello");
        let b = a.clone();
        assert!(Arc::ptr_eq(&a.message, &b.message));
    }

    #[test]
    fn display_is_raw_message() {
        let n = Notification::from("hi there");
        assert_eq!(n.to_string(), "hi there");
        assert_eq!(n.len(), 8);
        assert!(!n.is_empty());
    }

    #[test]
    fn debug_includes_message() {
        let n = Notification::from(String::from("x"));
        assert_eq!(format!("{n:?}"), "Notification(\"x\")");
    }
}
