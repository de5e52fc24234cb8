//! # PuntBot Channels
//!
//! Concrete `DeliverySink` transports. Two interchangeable options, chosen by
//! which credential is configured: an authenticated Discord bot REST send, or
//! a stateless Discord webhook POST.

pub mod discord;
pub mod webhook;

pub use discord::DiscordBotSink;
pub use webhook::DiscordWebhookSink;
