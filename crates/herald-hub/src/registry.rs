//! The set of registered client channels.
//!
//! Owned by the hub loop; nothing else holds a reference to it.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use crate::channel::{ClientChannel, ClientId, Delivery};
use crate::notification::Notification;

/// Why a client was dropped during a broadcast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvictionReason {
    /// Its queue was full.
    Saturated,
    /// Its reader had already gone.
    Disconnected,
}

impl EvictionReason {
    /// Label value used in logs and metrics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Saturated => "saturated",
            Self::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for EvictionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one fan-out.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Clients that received the notification.
    pub delivered: usize,
    /// Clients removed because delivery failed.
    pub evicted: Vec<(ClientId, EvictionReason)>,
}

/// Registered client channels, keyed by id.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: HashMap<ClientId, ClientChannel>,
}

impl ClientRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a channel.
    ///
    /// Returns `false` if a channel with the same id is already registered;
    /// the existing one is kept and `channel` is dropped, closing it.
    pub fn register(&mut self, channel: ClientChannel) -> bool {
        match self.clients.entry(channel.id().clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                let _ = slot.insert(channel);
                true
            }
        }
    }

    /// Remove a channel, closing it. Returns `false` if it was not present.
    pub fn deregister(&mut self, id: &ClientId) -> bool {
        self.clients.remove(id).is_some()
    }

    /// Try to queue `notification` on every channel without blocking.
    ///
    /// Channels that are full or whose reader is gone are removed (and so
    /// closed) before this returns.
    pub fn broadcast(&mut self, notification: &Notification) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        for (id, channel) in &self.clients {
            match channel.try_deliver(notification) {
                Delivery::Delivered => report.delivered += 1,
                Delivery::Saturated => report
                    .evicted
                    .push((id.clone(), EvictionReason::Saturated)),
                Delivery::Disconnected => report
                    .evicted
                    .push((id.clone(), EvictionReason::Disconnected)),
            }
        }
        for (id, _) in &report.evicted {
            let _ = self.clients.remove(id);
        }
        report
    }

    /// Close and remove every channel. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let count = self.clients.len();
        self.clients.clear();
        count
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &ClientId) -> bool {
        self.clients.contains_key(id)
    }

    /// Number of registered channels.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Whether no channel is registered.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
