//! The serialized broadcast hub.
//!
//! [`Hub::run`] pulls [`HubEvent`]s off a single queue and applies each one
//! to completion before taking the next. The [`ClientRegistry`] lives inside
//! the loop, so registration, removal and fan-out never race and need no
//! lock. Producers and connection handlers talk to the loop through cloned
//! [`HubHandle`]s.

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::channel::{ClientChannel, ClientId, ClientReceiver, client_channel};
use crate::errors::HubError;
use crate::metrics as names;
use crate::notification::Notification;
use crate::registry::{BroadcastReport, ClientRegistry};

/// One unit of work for the hub loop.
#[derive(Debug)]
pub enum HubEvent {
    /// Start delivering to a client.
    Register(ClientChannel),
    /// Stop delivering to a client and close its queue.
    Deregister(ClientId),
    /// Fan a notification out to every registered client.
    Broadcast(Notification),
}

/// Hub sizing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HubConfig {
    /// Capacity of each client's queue.
    pub client_queue_capacity: usize,
    /// Capacity of the inbound event queue.
    pub event_buffer: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            client_queue_capacity: 8,
            event_buffer: 256,
        }
    }
}

/// The hub loop and the state it exclusively owns.
pub struct Hub {
    events: mpsc::Receiver<HubEvent>,
    registry: ClientRegistry,
    clients: watch::Sender<usize>,
}

impl Hub {
    /// Create a hub and the first handle to it.
    pub fn new(config: HubConfig) -> (Self, HubHandle) {
        let (events_tx, events_rx) = mpsc::channel(config.event_buffer.max(1));
        let (clients_tx, clients_rx) = watch::channel(0);
        let hub = Self {
            events: events_rx,
            registry: ClientRegistry::new(),
            clients: clients_tx,
        };
        let handle = HubHandle {
            events: events_tx,
            clients: clients_rx,
            client_queue_capacity: config.client_queue_capacity.max(1),
        };
        (hub, handle)
    }

    /// Process events until `cancel` fires or every handle is dropped.
    ///
    /// On exit every remaining client queue is closed, which ends the
    /// corresponding connection handlers.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!("hub started");
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    info!("hub cancelled");
                    break;
                }
                event = self.events.recv() => match event {
                    Some(event) => self.apply(event),
                    None => {
                        info!("all hub handles dropped");
                        break;
                    }
                },
            }
        }
        let closed = self.registry.clear();
        self.publish_count();
        info!(closed, "hub stopped, client channels closed");
    }

    /// Apply one event to completion.
    pub fn apply(&mut self, event: HubEvent) {
        match event {
            HubEvent::Register(channel) => self.register(channel),
            HubEvent::Deregister(id) => self.deregister(&id),
            HubEvent::Broadcast(notification) => {
                let _ = self.broadcast(&notification);
            }
        }
    }

    /// Number of registered clients.
    pub fn client_count(&self) -> usize {
        self.registry.len()
    }

    fn register(&mut self, channel: ClientChannel) {
        let id = channel.id().clone();
        if self.registry.register(channel) {
            metrics::counter!(names::CLIENTS_CONNECTED_TOTAL).increment(1);
            self.publish_count();
            info!(client_id = %id, clients = self.registry.len(), "client registered");
        } else {
            warn!(client_id = %id, "client already registered, duplicate channel closed");
        }
    }

    fn deregister(&mut self, id: &ClientId) {
        if self.registry.deregister(id) {
            metrics::counter!(names::CLIENTS_DISCONNECTED_TOTAL).increment(1);
            self.publish_count();
            info!(client_id = %id, clients = self.registry.len(), "client deregistered");
        } else {
            debug!(client_id = %id, "deregister for unknown client ignored");
        }
    }

    fn broadcast(&mut self, notification: &Notification) -> BroadcastReport {
        let report = self.registry.broadcast(notification);
        metrics::counter!(names::BROADCASTS_TOTAL).increment(1);
        metrics::counter!(names::DELIVERIES_TOTAL).increment(report.delivered as u64);

        for (id, reason) in &report.evicted {
            metrics::counter!(names::EVICTIONS_TOTAL, "reason" => reason.as_str()).increment(1);
            metrics::counter!(names::CLIENTS_DISCONNECTED_TOTAL).increment(1);
            warn!(client_id = %id, %reason, "client queue unavailable, removed from hub");
        }
        if !report.evicted.is_empty() {
            self.publish_count();
        }
        debug!(
            bytes = notification.len(),
            recipients = report.delivered,
            evicted = report.evicted.len(),
            clients = self.registry.len(),
            "broadcast notification"
        );
        report
    }

    #[allow(clippy::cast_precision_loss)]
    fn publish_count(&self) {
        let count = self.registry.len();
        let _ = self.clients.send_replace(count);
        metrics::gauge!(names::CLIENTS_ACTIVE).set(count as f64);
    }
}

/// Cloneable submission side of the hub.
#[derive(Clone, Debug)]
pub struct HubHandle {
    events: mpsc::Sender<HubEvent>,
    clients: watch::Receiver<usize>,
    client_queue_capacity: usize,
}

impl HubHandle {
    /// Create a client queue sized for this hub.
    pub fn open_channel(&self) -> (ClientChannel, ClientReceiver) {
        client_channel(self.client_queue_capacity)
    }

    /// Submit an event, waiting for room in the event queue.
    pub async fn submit(&self, event: HubEvent) -> Result<(), HubError> {
        self.events.send(event).await.map_err(|_| HubError::Closed)
    }

    /// Hand a client queue to the hub.
    pub async fn register(&self, channel: ClientChannel) -> Result<(), HubError> {
        self.submit(HubEvent::Register(channel)).await
    }

    /// Ask the hub to drop a client. Unknown ids are ignored by the hub.
    pub async fn deregister(&self, id: ClientId) -> Result<(), HubError> {
        self.submit(HubEvent::Deregister(id)).await
    }

    /// Fan a notification out to every registered client.
    pub async fn broadcast(&self, notification: Notification) -> Result<(), HubError> {
        self.submit(HubEvent::Broadcast(notification)).await
    }

    /// Registered clients as of the last processed event.
    pub fn client_count(&self) -> usize {
        *self.clients.borrow()
    }

    /// Watch the registered-client count.
    pub fn watch_clients(&self) -> watch::Receiver<usize> {
        self.clients.clone()
    }

    /// Whether the hub loop has stopped.
    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }
}
