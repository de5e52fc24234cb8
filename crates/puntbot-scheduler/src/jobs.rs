//! Job definitions — the data model for scheduled alerts.

use chrono::DateTime;
use chrono_tz::Tz;

use puntbot_core::types::EventId;

/// A one-shot alert job, keyed by its event identifier.
#[derive(Debug, Clone)]
pub struct AlertJob {
    /// Dedup/naming key: `{track}_{race_time}_{selection}`.
    pub id: EventId,
    /// Absolute instant at which delivery should occur.
    pub fire_at: DateTime<Tz>,
    /// Rendered alert body.
    pub payload: String,
    /// Per-row destination override, if the feed provided one.
    pub destination: Option<String>,
    pub status: JobStatus,
}

/// Job lifecycle. Every job ends in exactly one terminal state; only
/// `Fired` writes to the sent-ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// Registered, waiting for its fire instant.
    Pending,
    /// Delivered successfully and recorded in the ledger.
    Fired,
    /// Delivery was invoked and reported failure. Not in the ledger, so a
    /// later full re-run may attempt it again.
    Failed,
    /// Identifier was already in the ledger at registration (or discovered
    /// there just before delivery).
    SkippedDuplicate,
    /// Fire instant had already elapsed at registration time.
    SkippedPast,
    /// Discovered due more than the tolerance window past its fire instant;
    /// dropped rather than sent stale.
    MisfireDropped,
}

impl AlertJob {
    pub fn new(
        id: EventId,
        fire_at: DateTime<Tz>,
        payload: String,
        destination: Option<String>,
    ) -> Self {
        Self {
            id,
            fire_at,
            payload,
            destination,
            status: JobStatus::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == JobStatus::Pending
    }
}
