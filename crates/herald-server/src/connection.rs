//! Per-client connection lifecycle.
//!
//! A [`ConnectionHandler`] owns the receiving end of one client queue and
//! forwards each notification to the client's transport until one side goes
//! away. Exactly one of three endings happens:
//!
//! - the client closes the transport: the handler deregisters and returns
//!   [`ConnectionOutcome::ClientClosed`];
//! - the hub closes the queue (eviction or shutdown):
//!   [`ConnectionOutcome::Evicted`];
//! - a transport write fails: [`ConnectionError::WriteFailed`]. The handler
//!   does not deregister here; the hub drops the client on its next
//!   broadcast once the queue's receiver is gone.

use herald_hub::{ClientId, ClientReceiver, HubError, HubHandle, Notification};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// How a connection ended without error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionOutcome {
    /// The client went away and was deregistered.
    ClientClosed,
    /// The hub closed the client's queue.
    Evicted,
}

/// A connection that ended abnormally.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectionError {
    /// Forwarding a notification to the client failed.
    #[error("write to client {0} failed")]
    WriteFailed(ClientId),
}

/// Bridges one registered client queue to one transport.
#[derive(Debug)]
pub struct ConnectionHandler {
    hub: HubHandle,
    receiver: ClientReceiver,
}

impl ConnectionHandler {
    /// Open a queue and register it with the hub.
    pub async fn accept(hub: &HubHandle) -> Result<Self, HubError> {
        let (channel, receiver) = hub.open_channel();
        hub.register(channel).await?;
        Ok(Self {
            hub: hub.clone(),
            receiver,
        })
    }

    /// The registered client id.
    pub fn id(&self) -> &ClientId {
        self.receiver.id()
    }

    /// Forward notifications to `transport` until the connection ends.
    pub async fn run(
        mut self,
        transport: mpsc::Sender<Notification>,
    ) -> Result<ConnectionOutcome, ConnectionError> {
        let id = self.receiver.id().clone();
        loop {
            tokio::select! {
                biased;
                () = transport.closed() => {
                    debug!(client_id = %id, "client closed stream");
                    if self.hub.deregister(id.clone()).await.is_err() {
                        debug!(client_id = %id, "hub already stopped");
                    }
                    return Ok(ConnectionOutcome::ClientClosed);
                }
                next = self.receiver.recv() => match next {
                    Some(notification) => {
                        if transport.send(notification).await.is_err() {
                            warn!(client_id = %id, "write to client failed");
                            return Err(ConnectionError::WriteFailed(id));
                        }
                    }
                    None => {
                        debug!(client_id = %id, "client queue closed by hub");
                        return Ok(ConnectionOutcome::Evicted);
                    }
                },
            }
        }
    }
}
