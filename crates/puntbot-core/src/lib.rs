//! # PuntBot Core
//!
//! Shared building blocks for the race alert bot: the validated record and
//! event-identifier types, environment-driven configuration, the unified error
//! enum, the `DeliverySink` trait implemented by the channel crate, and the
//! message template renderer.

pub mod config;
pub mod error;
pub mod template;
pub mod traits;
pub mod types;

pub use config::{LedgerScope, PuntBotConfig, Transport};
pub use error::{PuntBotError, Result};
pub use template::MessageTemplate;
pub use traits::DeliverySink;
pub use types::{EventId, RaceRecord};
