//! PuntBot configuration — environment-variable driven with typed defaults.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PuntBotError, Result};

/// Fallback zone when `PUNTBOT_TIMEZONE` is unset or unparseable.
pub const DEFAULT_TIMEZONE: &str = "Australia/Sydney";

/// Root configuration, sourced from the process environment (a local `.env`
/// file is loaded by the binary before this runs).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PuntBotConfig {
    /// Discord bot token (bot transport).
    pub bot_token: Option<String>,
    /// Default Discord channel id for the bot transport.
    pub channel_id: Option<String>,
    /// Discord webhook URL (webhook transport; preferred when set).
    pub webhook_url: Option<String>,
    /// Feed file, or a directory searched for today's `YYYY-MM-DD.csv`.
    pub csv_path: PathBuf,
    /// Minutes before race start at which the alert fires.
    pub lead_minutes: u32,
    /// IANA timezone name.
    pub timezone: String,
    /// Maximum late-discovery delay before a due job is dropped.
    pub misfire_tolerance_secs: u64,
    /// Sent-ledger file path.
    pub ledger_path: PathBuf,
    /// Dedup scope for the ledger.
    pub ledger_scope: LedgerScope,
    /// Optional external message template (JSON).
    pub template_path: Option<PathBuf>,
}

/// Whether delivered identifiers dedup globally or per calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerScope {
    /// One global ledger file; identifiers never recur.
    All,
    /// Ledger file suffixed with the zone's calendar date; identifiers may be
    /// reused the next day.
    Daily,
}

impl FromStr for LedgerScope {
    type Err = PuntBotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "daily" => Ok(Self::Daily),
            other => Err(PuntBotError::config(format!(
                "invalid LEDGER_SCOPE '{other}' (expected 'all' or 'daily')"
            ))),
        }
    }
}

/// The outbound transport selected from the configured credentials.
#[derive(Debug, Clone)]
pub enum Transport {
    /// Stateless HTTP POST to a Discord webhook URL.
    Webhook { url: String },
    /// Authenticated bot REST send to a channel.
    Bot {
        token: String,
        default_channel_id: String,
    },
}

impl Default for PuntBotConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            channel_id: None,
            webhook_url: None,
            csv_path: PathBuf::from("."),
            lead_minutes: 10,
            timezone: DEFAULT_TIMEZONE.into(),
            misfire_tolerance_secs: 60,
            ledger_path: PathBuf::from("logs/sent_races.json"),
            ledger_scope: LedgerScope::All,
            template_path: None,
        }
    }
}

impl PuntBotConfig {
    /// Build the config from environment variables, falling back to defaults
    /// for anything unset. Malformed numeric/enum values are a fatal config
    /// error rather than a silent fallback.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let lead_minutes = match env_var("ALERT_LEAD_MINUTES") {
            Some(v) => v.parse::<u32>().map_err(|_| {
                PuntBotError::config(format!("invalid ALERT_LEAD_MINUTES '{v}'"))
            })?,
            None => defaults.lead_minutes,
        };
        let misfire_tolerance_secs = match env_var("MISFIRE_TOLERANCE_SECS") {
            Some(v) => v.parse::<u64>().map_err(|_| {
                PuntBotError::config(format!("invalid MISFIRE_TOLERANCE_SECS '{v}'"))
            })?,
            None => defaults.misfire_tolerance_secs,
        };
        let ledger_scope = match env_var("LEDGER_SCOPE") {
            Some(v) => v.parse()?,
            None => defaults.ledger_scope,
        };

        Ok(Self {
            bot_token: env_var("DISCORD_BOT_TOKEN"),
            channel_id: env_var("DISCORD_CHANNEL_ID"),
            webhook_url: env_var("DISCORD_WEBHOOK_URL"),
            csv_path: env_var("CSV_PATH").map(PathBuf::from).unwrap_or(defaults.csv_path),
            lead_minutes,
            timezone: env_var("PUNTBOT_TIMEZONE").unwrap_or(defaults.timezone),
            misfire_tolerance_secs,
            ledger_path: env_var("SENT_LEDGER_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.ledger_path),
            ledger_scope,
            template_path: env_var("MESSAGE_TEMPLATE_PATH").map(PathBuf::from),
        })
    }

    /// Pick the outbound transport from the configured credentials.
    /// Webhook wins when both are present. Neither configured is fatal.
    pub fn transport(&self) -> Result<Transport> {
        if let Some(url) = &self.webhook_url {
            return Ok(Transport::Webhook { url: url.clone() });
        }
        match (&self.bot_token, &self.channel_id) {
            (Some(token), Some(channel)) => Ok(Transport::Bot {
                token: token.clone(),
                default_channel_id: channel.clone(),
            }),
            _ => Err(PuntBotError::config(
                "no transport configured: set DISCORD_WEBHOOK_URL, or both \
                 DISCORD_BOT_TOKEN and DISCORD_CHANNEL_ID",
            )),
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = PuntBotConfig::default();
        assert_eq!(cfg.lead_minutes, 10);
        assert_eq!(cfg.misfire_tolerance_secs, 60);
        assert_eq!(cfg.timezone, "Australia/Sydney");
        assert_eq!(cfg.ledger_scope, LedgerScope::All);
    }

    #[test]
    fn test_transport_requires_credentials() {
        let cfg = PuntBotConfig::default();
        assert!(cfg.transport().is_err());
    }

    #[test]
    fn test_transport_prefers_webhook() {
        let cfg = PuntBotConfig {
            bot_token: Some("t".into()),
            channel_id: Some("c".into()),
            webhook_url: Some("https://discord.com/api/webhooks/x".into()),
            ..Default::default()
        };
        assert!(matches!(cfg.transport(), Ok(Transport::Webhook { .. })));
    }

    #[test]
    fn test_transport_bot_needs_both_fields() {
        let cfg = PuntBotConfig {
            bot_token: Some("t".into()),
            ..Default::default()
        };
        assert!(cfg.transport().is_err());
    }

    #[test]
    fn test_ledger_scope_parse() {
        assert_eq!("daily".parse::<LedgerScope>().unwrap(), LedgerScope::Daily);
        assert_eq!("ALL".parse::<LedgerScope>().unwrap(), LedgerScope::All);
        assert!("weekly".parse::<LedgerScope>().is_err());
    }
}
