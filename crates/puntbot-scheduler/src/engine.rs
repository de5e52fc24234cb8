//! Alert scheduler engine — registration pass plus the timed run loop.
//!
//! The scheduler and its ledger are constructed explicitly and injected from
//! the top-level context; there is no process-global state. Registration is
//! synchronous and happens once, before the run loop starts, so ledger reads
//! during registration never race delivery-time writes. Deliveries run
//! sequentially in fire-instant order, which also serializes ledger updates.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use tokio::sync::{Mutex, watch};

use puntbot_core::traits::DeliverySink;
use puntbot_core::types::EventId;

use crate::jobs::{AlertJob, JobStatus};
use crate::ledger::SentLedger;

pub struct AlertScheduler {
    jobs: Vec<AlertJob>,
    ledger: SentLedger,
    misfire_tolerance: Duration,
    pending_tx: watch::Sender<usize>,
}

impl AlertScheduler {
    /// Create a scheduler around an opened ledger. The returned receiver
    /// reports the pending-job count for the completion monitor.
    pub fn new(
        ledger: SentLedger,
        misfire_tolerance_secs: u64,
    ) -> (Self, watch::Receiver<usize>) {
        let (pending_tx, pending_rx) = watch::channel(0);
        (
            Self {
                jobs: Vec::new(),
                ledger,
                misfire_tolerance: Duration::seconds(misfire_tolerance_secs as i64),
                pending_tx,
            },
            pending_rx,
        )
    }

    /// Register one job. The outcome is recorded on the job list once per
    /// identifier:
    ///
    /// 1. identifier already delivered (ledger) → `SkippedDuplicate`;
    /// 2. fire instant already elapsed → `SkippedPast` (the lead time is
    ///    gone; sending now would be a stale alert);
    /// 3. identifier already pending → idempotent no-op;
    /// 4. otherwise a `Pending` job is queued.
    pub fn register(
        &mut self,
        id: EventId,
        fire_at: DateTime<Tz>,
        payload: String,
        destination: Option<String>,
        now: DateTime<Tz>,
    ) -> JobStatus {
        if self.ledger.contains(&id) {
            tracing::debug!("Skipping {id}: already delivered");
            self.track_skip(id, fire_at, payload, destination, JobStatus::SkippedDuplicate);
            return JobStatus::SkippedDuplicate;
        }
        if fire_at < now {
            tracing::debug!("Skipping {id}: fire instant already passed");
            self.track_skip(id, fire_at, payload, destination, JobStatus::SkippedPast);
            return JobStatus::SkippedPast;
        }
        if self.jobs.iter().any(|j| j.is_pending() && j.id == id) {
            return JobStatus::Pending;
        }
        self.jobs.push(AlertJob::new(id, fire_at, payload, destination));
        self.publish_pending();
        JobStatus::Pending
    }

    /// Record a skipped identifier once; re-registrations of an id already
    /// on the job list leave it unchanged.
    fn track_skip(
        &mut self,
        id: EventId,
        fire_at: DateTime<Tz>,
        payload: String,
        destination: Option<String>,
        status: JobStatus,
    ) {
        if self.jobs.iter().any(|j| j.id == id) {
            return;
        }
        let mut job = AlertJob::new(id, fire_at, payload, destination);
        job.status = status;
        self.jobs.push(job);
    }

    pub fn pending_count(&self) -> usize {
        self.jobs.iter().filter(|j| j.is_pending()).count()
    }

    pub fn jobs(&self) -> &[AlertJob] {
        &self.jobs
    }

    #[cfg(test)]
    pub(crate) fn ledger_mut(&mut self) -> &mut SentLedger {
        &mut self.ledger
    }

    /// Earliest pending job, by fire instant (stable for ties).
    fn next_pending(&self) -> Option<(usize, DateTime<Tz>)> {
        self.jobs
            .iter()
            .enumerate()
            .filter(|(_, j)| j.is_pending())
            .min_by_key(|(_, j)| j.fire_at)
            .map(|(idx, j)| (idx, j.fire_at))
    }

    fn complete(&mut self, idx: usize, status: JobStatus) {
        self.jobs[idx].status = status;
        self.publish_pending();
    }

    fn publish_pending(&self) {
        // Monitor may have gone away already; that only means nobody is
        // waiting for the drain signal.
        let _ = self.pending_tx.send(self.pending_count());
    }
}

/// Run all pending jobs to completion: sleep until the earliest fire
/// instant, then deliver, in non-decreasing fire-instant order. Returns once
/// the pending set is drained; the in-flight delivery always finishes first.
pub async fn run(scheduler: Arc<Mutex<AlertScheduler>>, sink: Arc<dyn DeliverySink>) {
    loop {
        let next = scheduler.lock().await.next_pending();
        let Some((idx, fire_at)) = next else { break };

        let wait = (fire_at.with_timezone(&Utc) - Utc::now())
            .to_std()
            .unwrap_or(std::time::Duration::ZERO);
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }

        let mut sched = scheduler.lock().await;
        let lateness = Utc::now() - fire_at.with_timezone(&Utc);
        if lateness > sched.misfire_tolerance {
            let id = sched.jobs[idx].id.clone();
            tracing::warn!(
                "Dropping {id}: discovered {}s past fire instant (tolerance {}s)",
                lateness.num_seconds(),
                sched.misfire_tolerance.num_seconds()
            );
            sched.complete(idx, JobStatus::MisfireDropped);
            continue;
        }

        let job = sched.jobs[idx].clone();
        // Re-check the ledger at the last moment: registration may have
        // happened long before firing.
        if sched.ledger.contains(&job.id) {
            sched.complete(idx, JobStatus::SkippedDuplicate);
            continue;
        }

        tracing::info!("Firing alert {} via {}", job.id, sink.name());
        match sink
            .deliver(&job.payload, &job.id, job.destination.as_deref())
            .await
        {
            Ok(()) => {
                if let Err(e) = sched.ledger.record(&job.id) {
                    tracing::error!("Delivered {} but failed to record it: {e}", job.id);
                }
                sched.complete(idx, JobStatus::Fired);
            }
            Err(e) => {
                tracing::warn!("Delivery failed for {}: {e}", job.id);
                sched.complete(idx, JobStatus::Failed);
            }
        }
    }
    tracing::info!("Alert batch drained");
}
