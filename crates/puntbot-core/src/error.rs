//! Unified error types for PuntBot.

use thiserror::Error;

/// Result type alias using PuntBotError.
pub type Result<T> = std::result::Result<T, PuntBotError>;

#[derive(Error, Debug)]
pub enum PuntBotError {
    // Fatal at startup: missing credentials, bad destination, bad settings.
    #[error("Configuration error: {0}")]
    Config(String),

    // Fatal for the run: feed file missing or unreadable.
    #[error("Feed error: {0}")]
    Feed(String),

    // Per-delivery: transport failure or non-success status. Never fatal.
    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PuntBotError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn feed(msg: impl Into<String>) -> Self {
        Self::Feed(msg.into())
    }

    pub fn channel(msg: impl Into<String>) -> Self {
        Self::Channel(msg.into())
    }

    pub fn ledger(msg: impl Into<String>) -> Self {
        Self::Ledger(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PuntBotError::Channel("timeout".into());
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_error_constructors() {
        let e1 = PuntBotError::config("no token");
        assert!(matches!(e1, PuntBotError::Config(_)));

        let e2 = PuntBotError::feed("missing csv");
        assert!(matches!(e2, PuntBotError::Feed(_)));

        let e3 = PuntBotError::channel("404");
        assert!(matches!(e3, PuntBotError::Channel(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PuntBotError = io_err.into();
        assert!(matches!(err, PuntBotError::Io(_)));
    }
}
