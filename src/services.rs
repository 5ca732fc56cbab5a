//! Background poller lifecycle.
//!
//! `Poller` owns the single repeating status poll. It is started when the
//! panel attaches and cancelled when it detaches (or when the handle is
//! dropped). Cancelling stops the timer only: a tick that is already talking
//! to the daemon runs to completion.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config;
use crate::error::AppError;
use crate::reconciler::Reconciler;
use crate::remote::RemoteControl;

/// Spawns the status poller.
pub struct Poller;

impl Poller {
    /// Attach with the default 1 s period.
    pub fn attach<R: RemoteControl>(reconciler: Arc<Reconciler<R>>) -> PollerHandle {
        Self::attach_with_period(
            reconciler,
            Duration::from_secs(config::POLL_INTERVAL_SECS),
        )
    }

    pub fn attach_with_period<R: RemoteControl>(
        reconciler: Arc<Reconciler<R>>,
        period: Duration,
    ) -> PollerHandle {
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // A slow tick pushes the schedule back instead of bursting to catch up.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::debug!("Poller attached ({period:?})");
            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                poll_once(&reconciler).await;
            }
            tracing::debug!("Poller detached");
        });

        PollerHandle {
            cancel,
            task: Some(task),
        }
    }
}

/// One poll tick. Failures are logged at debug level and otherwise ignored.
pub async fn poll_once<R: RemoteControl>(reconciler: &Reconciler<R>) {
    match reconciler.remote_running_state().await {
        Ok(running) => {
            if let Err(e) = reconciler.observe_running_state(running).await {
                tracing::warn!("Failed to record daemon state: {e}");
            }
            if running {
                match reconciler.refresh_device_status().await {
                    Ok(()) => {}
                    Err(e @ AppError::MalformedResponse(_)) => {
                        tracing::warn!("{e}; keeping previous table")
                    }
                    Err(e) => tracing::debug!("Device status poll failed: {e}"),
                }
            }
        }
        Err(e) => tracing::debug!("State poll failed: {e}"),
    }

    if let Err(e) = reconciler.sync_list_disabled() {
        tracing::warn!("Failed to persist exit node list flag: {e}");
    }
}

/// Owner of a running poller. Dropping it detaches.
pub struct PollerHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Cancel the timer and wait for the current tick (if any) to finish.
    pub async fn detach(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("Poller task ended abnormally: {e}");
            }
        }
    }

    pub fn is_attached(&self) -> bool {
        !self.cancel.is_cancelled()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
