//! Graceful shutdown coordination via `CancellationToken`.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Default time allowed for tasks to drain before they are aborted.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Owns the process-wide cancellation token.
///
/// The hub loop, the heartbeat and the HTTP listener all watch clones of the
/// same token, so one [`ShutdownCoordinator::shutdown`] stops every one of
/// them.
#[derive(Debug, Default)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
}

impl ShutdownCoordinator {
    /// Create a coordinator with a fresh token.
    pub fn new() -> Self {
        Self::default()
    }

    /// A clone of the shared token.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Signal shutdown. Idempotent.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Whether shutdown has been signalled.
    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Signal shutdown and wait up to `timeout` for `handles` to finish.
    ///
    /// Tasks still running at the deadline are aborted. Returns `true` if
    /// every task finished in time.
    pub async fn graceful_shutdown(
        &self,
        handles: Vec<JoinHandle<()>>,
        timeout: Option<Duration>,
    ) -> bool {
        let timeout = timeout.unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT);
        self.shutdown();
        info!(task_count = handles.len(), ?timeout, "waiting for tasks to finish");

        let aborts: Vec<_> = handles.iter().map(JoinHandle::abort_handle).collect();
        let drain = futures::future::join_all(handles);
        if tokio::time::timeout(timeout, drain).await.is_ok() {
            info!("shutdown complete");
            true
        } else {
            warn!(?timeout, "shutdown timed out, aborting remaining tasks");
            for abort in aborts {
                abort.abort();
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_running() {
        assert!(!ShutdownCoordinator::new().is_shutting_down());
    }

    #[test]
    fn shutdown_cancels_every_token() {
        let coord = ShutdownCoordinator::new();
        let t1 = coord.token();
        let t2 = coord.token();
        coord.shutdown();
        coord.shutdown();
        assert!(coord.is_shutting_down());
        assert!(t1.is_cancelled());
        assert!(t2.is_cancelled());
    }

    #[tokio::test]
    async fn graceful_shutdown_awaits_all_tasks() {
        let coord = ShutdownCoordinator::new();
        let handles = (0..3)
            .map(|_| {
                let token = coord.token();
                tokio::spawn(async move { token.cancelled().await })
            })
            .collect();
        assert!(coord.graceful_shutdown(handles, None).await);
    }

    #[tokio::test(start_paused = true)]
    async fn stuck_task_is_aborted_after_timeout() {
        let coord = ShutdownCoordinator::new();
        let stuck = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });
        let abort = stuck.abort_handle();

        let drained = coord
            .graceful_shutdown(vec![stuck], Some(Duration::from_millis(100)))
            .await;
        assert!(!drained);
        while !abort.is_finished() {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn empty_handle_list_completes() {
        let coord = ShutdownCoordinator::new();
        assert!(coord.graceful_shutdown(vec![], None).await);
        assert!(coord.is_shutting_down());
    }
}
