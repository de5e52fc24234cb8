//! # PuntBot Scheduler
//!
//! The event scheduling and delivery engine: turns a batch of validated race
//! records into precisely timed, deduplicated, fault-isolated alert jobs and
//! runs them to completion.
//!
//! ```text
//! register pass (sync)              run loop (tokio)
//!   ledger hit   → SkippedDuplicate   sleep until earliest fire instant
//!   fire < now   → SkippedPast        past tolerance → MisfireDropped
//!   else         → Pending            ledger re-check → SkippedDuplicate
//!                                     sink.deliver → Fired (+ ledger) | Failed
//! ```
//!
//! One batch of one-shot, time-anchored jobs per run; no recurrence, no
//! retry. The completion monitor observes the pending count and lets the
//! process shut down once the batch is drained.

pub mod engine;
pub mod jobs;
pub mod ledger;
pub mod monitor;

pub use engine::{AlertScheduler, run};
pub use jobs::{AlertJob, JobStatus};
pub use ledger::SentLedger;
pub use monitor::wait_until_drained;
