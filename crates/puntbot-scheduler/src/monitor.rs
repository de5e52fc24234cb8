//! Completion monitor — signals when the day's batch is drained.
//!
//! Event-driven rather than polled: the scheduler publishes its pending-job
//! count on a watch channel every time a job enters or leaves the pending
//! set, and this waits for it to reach zero. An always-on process can then
//! terminate itself once the batch is exhausted.

use tokio::sync::watch;

/// Wait until the scheduler reports zero pending jobs. Also returns if the
/// scheduler is dropped (sender closed), so the monitor can never hang a
/// shutdown.
pub async fn wait_until_drained(mut pending_rx: watch::Receiver<usize>) {
    loop {
        if *pending_rx.borrow_and_update() == 0 {
            return;
        }
        if pending_rx.changed().await.is_err() {
            return;
        }
    }
}
