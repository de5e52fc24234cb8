//! # PuntBot Feed
//!
//! Everything between the raw CSV feed and a schedulable record: path/date
//! resolution, CSV reading, row validation, and send-time calculation.

pub mod send_time;
pub mod source;
pub mod validate;

pub use send_time::SendTimeCalculator;
pub use source::{FeedRow, read_feed, resolve_feed_path};
pub use validate::validate_rows;
