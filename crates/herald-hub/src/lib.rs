//! # herald-hub
//!
//! In-process fan-out of text notifications to connected clients.
//!
//! - [`Hub`] owns the client registry and applies [`HubEvent`]s one at a
//!   time. Everything else holds a [`HubHandle`].
//! - Each client gets a bounded queue from [`HubHandle::open_channel`]. A
//!   broadcast never waits on a slow client: a full or closed queue gets the
//!   client evicted instead.
//! - [`run_heartbeat`] broadcasts a numbered server update on a fixed
//!   interval.

#![deny(unsafe_code)]

pub mod channel;
pub mod errors;
pub mod heartbeat;
pub mod hub;
pub mod metrics;
pub mod notification;
pub mod registry;

pub use channel::{ClientChannel, ClientId, ClientReceiver, Delivery, client_channel};
pub use errors::HubError;
pub use heartbeat::{HeartbeatConfig, HeartbeatExit, run_heartbeat};
pub use hub::{Hub, HubConfig, HubEvent, HubHandle};
pub use notification::Notification;
pub use registry::{BroadcastReport, ClientRegistry, EvictionReason};
