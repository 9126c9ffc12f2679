//! Periodic server-originated notifications.

use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::hub::HubHandle;
use crate::notification::Notification;

/// Heartbeat cadence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeartbeatConfig {
    /// Delay before the first heartbeat and between subsequent ones.
    pub interval: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
        }
    }
}

/// Why [`run_heartbeat`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeartbeatExit {
    /// The cancellation token fired.
    Cancelled,
    /// The hub stopped accepting events.
    HubClosed,
}

/// Broadcast `Automatic server update #N` every interval, N counting from 1.
///
/// The first heartbeat is sent one full interval after start.
pub async fn run_heartbeat(
    hub: HubHandle,
    config: HeartbeatConfig,
    cancel: CancellationToken,
) -> HeartbeatExit {
    let period = config.interval.max(Duration::from_millis(1));
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(interval = ?period, "heartbeat started");

    let mut seq: u64 = 0;
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                info!(sent = seq, "heartbeat stopped");
                return HeartbeatExit::Cancelled;
            }
            _ = ticker.tick() => {
                seq += 1;
                debug!(seq, clients = hub.client_count(), "sending heartbeat");
                if hub.broadcast(Notification::heartbeat(seq)).await.is_err() {
                    warn!(seq, "hub closed, heartbeat stopping");
                    return HeartbeatExit::HubClosed;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::{Hub, HubConfig};

    fn config(secs: u64) -> HeartbeatConfig {
        HeartbeatConfig {
            interval: Duration::from_secs(secs),
        }
    }

    #[test]
    fn default_interval_is_five_seconds() {
        assert_eq!(HeartbeatConfig::default().interval, Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn first_heartbeat_after_one_interval() {
        let (hub, handle) = Hub::new(HubConfig::default());
        let cancel = CancellationToken::new();
        let _hub_task = tokio::spawn(hub.run(cancel.clone()));

        let (channel, mut rx) = handle.open_channel();
        handle.register(channel).await.unwrap();

        let start = Instant::now();
        let _beat = tokio::spawn(run_heartbeat(handle.clone(), config(5), cancel.clone()));

        let first = rx.recv().await.unwrap();
        assert_eq!(first.message(), "Automatic server update #1");
        assert!(start.elapsed() >= Duration::from_secs(5));
        assert!(start.elapsed() < Duration::from_secs(10));

        let second = rx.recv().await.unwrap();
        assert_eq!(second.message(), "Automatic server update #2");
        assert!(start.elapsed() >= Duration::from_secs(10));

        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_heartbeat() {
        let (hub, handle) = Hub::new(HubConfig::default());
        let hub_cancel = CancellationToken::new();
        let _hub_task = tokio::spawn(hub.run(hub_cancel.clone()));

        let cancel = CancellationToken::new();
        let beat = tokio::spawn(run_heartbeat(handle, config(5), cancel.clone()));
        time::sleep(Duration::from_secs(12)).await;
        cancel.cancel();
        assert_eq!(beat.await.unwrap(), HeartbeatExit::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn no_clients_is_not_an_error() {
        let (hub, handle) = Hub::new(HubConfig::default());
        let cancel = CancellationToken::new();
        let _hub_task = tokio::spawn(hub.run(cancel.clone()));

        let beat = tokio::spawn(run_heartbeat(handle.clone(), config(1), cancel.clone()));
        time::sleep(Duration::from_secs(5)).await;
        assert!(!beat.is_finished());
        cancel.cancel();
        assert_eq!(beat.await.unwrap(), HeartbeatExit::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_hub_closed() {
        let (hub, handle) = Hub::new(HubConfig::default());
        drop(hub);
        let exit = run_heartbeat(handle, config(5), CancellationToken::new()).await;
        assert_eq!(exit, HeartbeatExit::HubClosed);
    }
}
