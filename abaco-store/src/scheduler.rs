//! Periodic refresh trigger.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::coordinator::{RefreshCoordinator, RefreshOutcome};

/// Handle to a running refresh task.
#[derive(Debug)]
pub struct SchedulerHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stops the task after any cycle in progress and waits for it.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Refresh task ended abnormally");
        }
    }

    /// Returns true once the task has exited on its own.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawns a task that triggers a refresh immediately and then every
/// `period`.
///
/// Ticks missed while a slow cycle runs are skipped, not replayed. The task
/// exits once the coordinator reports that re-authentication is required.
pub fn spawn_refresh_task(coordinator: Arc<RefreshCoordinator>, period: Duration) -> SchedulerHandle {
    let (stop, mut stopped) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(period_secs = period.as_secs(), "Refresh schedule started");

        loop {
            tokio::select! {
                _ = stopped.changed() => break,
                _ = ticker.tick() => {}
            }

            match coordinator.refresh().await {
                RefreshOutcome::Committed(report) => {
                    debug!(revision = report.revision, "Scheduled refresh committed");
                }
                RefreshOutcome::Coalesced => debug!("Scheduled tick coalesced"),
                RefreshOutcome::AuthRequired => {
                    warn!("Refresh schedule stopped, re-authentication required");
                    break;
                }
            }
            // An AuthFailed cycle latches; the next trigger would be refused.
            if coordinator.needs_reauth() {
                warn!("Refresh schedule stopped, re-authentication required");
                break;
            }
        }
        debug!("Refresh schedule ended");
    });

    SchedulerHandle { stop, task }
}
