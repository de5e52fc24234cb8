//! The delivery seam between the scheduler and concrete transports.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::EventId;

/// Abstract destination for a rendered alert.
///
/// Implementations must report failure through the `Result` — a delivery
/// problem never panics across this boundary, so one job's failure cannot
/// abort the scheduler or other jobs. The scheduler invokes `deliver` at most
/// once per job and does not retry.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Transport name for logging ("discord", "webhook").
    fn name(&self) -> &str;

    /// Send a rendered payload. `destination` is the per-row override, if any;
    /// sinks fall back to their configured default when it is absent.
    async fn deliver(
        &self,
        payload: &str,
        event_id: &EventId,
        destination: Option<&str>,
    ) -> Result<()>;
}
