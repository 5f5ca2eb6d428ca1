//! SyncEngine: the single-consumer polling loop over the durable queue.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use strata_core::config::EngineConfig;
use strata_core::traits::EventQueue;
use strata_core::StrataResult;
use strata_observability::events;

use crate::reconcile::{ReconcileReport, Reconciler};
use crate::SyncContext;

/// Result of one poll.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// Nothing pending.
    Idle,
    /// One event reconciled and acknowledged.
    Processed {
        report: ReconcileReport,
        /// Whether the ack removed the row. False when a newer event
        /// coalesced onto the path mid-flight.
        acknowledged: bool,
    },
}

pub struct SyncEngine {
    queue: Arc<dyn EventQueue>,
    reconciler: Reconciler,
    poll_interval: Duration,
    error_backoff: Duration,
}

impl SyncEngine {
    pub fn new(ctx: SyncContext, config: &EngineConfig) -> Self {
        Self {
            queue: ctx.queue.clone(),
            reconciler: Reconciler::new(ctx, config),
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            error_backoff: Duration::from_secs(config.error_backoff_secs),
        }
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Process at most one event. An error means the event was left
    /// unacknowledged and will be redelivered.
    pub async fn poll_once(&self) -> StrataResult<PollOutcome> {
        let Some(event) = self.queue.dequeue_oldest().await? else {
            return Ok(PollOutcome::Idle);
        };

        let report = match self.reconciler.reconcile(&event).await {
            Ok(report) => report,
            Err(e) if e.is_transient() => return Err(e),
            Err(e) => {
                self.reconciler.record_failure(&event, &e).await?;
                ReconcileReport {
                    path: event.path.clone(),
                    event_id: event.event_id.clone(),
                    ..Default::default()
                }
            }
        };

        let acknowledged = self.queue.acknowledge(&event.event_id).await?;
        if !acknowledged {
            tracing::debug!(
                path = %event.path,
                event_id = %event.event_id,
                "newer event pending for path, ack left it in place"
            );
        }
        Ok(PollOutcome::Processed { report, acknowledged })
    }

    /// Poll until `shutdown` resolves. Sleeps the poll interval when idle
    /// and the error backoff after an infrastructure failure.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        tracing::info!(channel = %self.reconciler.channel(), "sync engine started");
        loop {
            let pause = match self.poll_once().await {
                Ok(PollOutcome::Processed { .. }) => None,
                Ok(PollOutcome::Idle) => Some(self.poll_interval),
                Err(e) => {
                    events::transient_backoff(&e.chain(), self.error_backoff.as_secs());
                    Some(self.error_backoff)
                }
            };
            if let Some(pause) = pause {
                tokio::select! {
                    _ = &mut shutdown => break,
                    _ = tokio::time::sleep(pause) => {}
                }
            } else if shutdown_requested(&mut shutdown).await {
                break;
            }
        }
        tracing::info!("sync engine stopped");
    }

    /// Poll forever.
    pub async fn run(&self) {
        self.run_until(std::future::pending()).await
    }
}

/// Whether `shutdown` has already resolved, without waiting on it.
async fn shutdown_requested<F>(shutdown: &mut std::pin::Pin<&mut F>) -> bool
where
    F: Future<Output = ()>,
{
    tokio::select! {
        biased;
        _ = shutdown.as_mut() => true,
        _ = std::future::ready(()) => false,
    }
}
