//! Per-client bounded outbound queues.
//!
//! [`client_channel`] creates the two halves of one client's conduit. The
//! [`ClientChannel`] (sender) is handed to the hub, which becomes its only
//! writer; the [`ClientReceiver`] stays with the connection handler, its only
//! reader. Dropping the `ClientChannel` closes the queue.

use std::fmt;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

use crate::notification::Notification;

/// Unique client identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(String);

impl ClientId {
    /// Generate a fresh time-ordered id.
    pub fn new() -> Self {
        Self(format!("client_{}", Uuid::now_v7()))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Result of a non-blocking delivery attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// The notification was queued.
    Delivered,
    /// The queue is full; the client is not draining.
    Saturated,
    /// The reader has gone away.
    Disconnected,
}

/// Hub-side half of a client's queue.
#[derive(Debug)]
pub struct ClientChannel {
    id: ClientId,
    tx: mpsc::Sender<Notification>,
}

impl ClientChannel {
    /// Identifier shared with the matching [`ClientReceiver`].
    pub fn id(&self) -> &ClientId {
        &self.id
    }

    /// Queue `notification` without waiting.
    pub fn try_deliver(&self, notification: &Notification) -> Delivery {
        match self.tx.try_send(notification.clone()) {
            Ok(()) => Delivery::Delivered,
            Err(TrySendError::Full(_)) => Delivery::Saturated,
            Err(TrySendError::Closed(_)) => Delivery::Disconnected,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_disconnected(&self) -> bool {
        self.tx.is_closed()
    }

    #[cfg(test)]
    pub(crate) fn remaining_capacity(&self) -> usize {
        self.tx.capacity()
    }
}

/// Handler-side half of a client's queue.
#[derive(Debug)]
pub struct ClientReceiver {
    id: ClientId,
    rx: mpsc::Receiver<Notification>,
}

impl ClientReceiver {
    /// Identifier shared with the matching [`ClientChannel`].
    pub fn id(&self) -> &ClientId {
        &self.id
    }

    /// Wait for the next notification.
    ///
    /// Returns `None` once the hub has closed the queue and everything
    /// already queued has been read.
    pub async fn recv(&mut self) -> Option<Notification> {
        self.rx.recv().await
    }

    /// Take a queued notification without waiting.
    pub fn try_recv(&mut self) -> Option<Notification> {
        self.rx.try_recv().ok()
    }

    /// Whether the hub has closed the queue.
    pub fn is_closed(&self) -> bool {
        self.rx.is_closed()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.rx.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

/// Create a client queue holding at most `capacity` notifications
/// (clamped to at least 1).
pub fn client_channel(capacity: usize) -> (ClientChannel, ClientReceiver) {
    client_channel_with_id(ClientId::new(), capacity)
}

pub(crate) fn client_channel_with_id(
    id: ClientId,
    capacity: usize,
) -> (ClientChannel, ClientReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        ClientChannel { id: id.clone(), tx },
        ClientReceiver { id, rx },
    )
}
