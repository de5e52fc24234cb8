//! Discord bot channel — alert delivery via the REST API.

use async_trait::async_trait;
use serde::Deserialize;

use puntbot_core::error::{PuntBotError, Result};
use puntbot_core::traits::DeliverySink;
use puntbot_core::types::EventId;

const API_BASE: &str = "https://discord.com/api/v10";
const EMBED_COLOR: u32 = 0x808080;

/// Authenticated bot transport. Sends each alert as an embed to the per-row
/// destination channel when one is given; an override channel the bot cannot
/// reach falls back to the configured default channel.
pub struct DiscordBotSink {
    default_channel_id: String,
    client: reqwest::Client,
}

impl DiscordBotSink {
    pub fn new(bot_token: &str, default_channel_id: &str) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        let auth = format!("Bot {bot_token}")
            .parse()
            .map_err(|_| PuntBotError::config("bot token contains invalid header characters"))?;
        headers.insert("Authorization", auth);
        headers.insert("User-Agent", "PuntBot/0.2".parse().expect("static header"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| PuntBotError::channel(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            default_channel_id: default_channel_id.to_string(),
            client,
        })
    }

    /// Verify the token by fetching the bot identity. Called once at startup
    /// so a bad credential fails the run before anything is scheduled.
    pub async fn connect(&self) -> Result<DiscordUser> {
        let response = self
            .client
            .get(format!("{API_BASE}/users/@me"))
            .send()
            .await
            .map_err(|e| PuntBotError::channel(format!("getMe failed: {e}")))?;
        if !response.status().is_success() {
            return Err(PuntBotError::config(format!(
                "Discord rejected the bot token: {}",
                response.status()
            )));
        }
        let me: DiscordUser = response
            .json()
            .await
            .map_err(|e| PuntBotError::channel(format!("invalid getMe response: {e}")))?;
        tracing::info!("Discord bot: {} ({})", me.username, me.id);
        Ok(me)
    }

    async fn send_embed(
        &self,
        channel_id: &str,
        description: &str,
    ) -> std::result::Result<(), SendFailure> {
        let url = format!("{API_BASE}/channels/{channel_id}/messages");
        let body = embed_body(description);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SendFailure {
                status: None,
                message: format!("Discord send failed: {e}"),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(SendFailure {
                status: Some(status),
                message: format!("Discord {status}: {text}"),
            });
        }
        Ok(())
    }
}

/// A failed channel send, keeping the HTTP status when one came back.
struct SendFailure {
    status: Option<reqwest::StatusCode>,
    message: String,
}

impl From<SendFailure> for PuntBotError {
    fn from(failure: SendFailure) -> Self {
        PuntBotError::channel(failure.message)
    }
}

/// Unknown channel (404) or no bot access (403) means the override id is
/// unusable and the default channel is still worth a try. Transient errors
/// (rate limits, 5xx, network) would hit the default channel too.
fn is_unreachable_channel(status: Option<reqwest::StatusCode>) -> bool {
    matches!(
        status,
        Some(reqwest::StatusCode::FORBIDDEN | reqwest::StatusCode::NOT_FOUND)
    )
}

/// Embed payload for a bot channel send.
fn embed_body(description: &str) -> serde_json::Value {
    serde_json::json!({
        "embeds": [{
            "color": EMBED_COLOR,
            "description": description,
        }]
    })
}

#[async_trait]
impl DeliverySink for DiscordBotSink {
    fn name(&self) -> &str {
        "discord"
    }

    async fn deliver(
        &self,
        payload: &str,
        event_id: &EventId,
        destination: Option<&str>,
    ) -> Result<()> {
        let channel_id = match destination {
            Some(id) if !id.trim().is_empty() => id,
            _ => &self.default_channel_id,
        };

        match self.send_embed(channel_id, payload).await {
            Ok(()) => {
                tracing::info!("Message sent for {event_id}");
                Ok(())
            }
            Err(failure)
                if channel_id != self.default_channel_id
                    && is_unreachable_channel(failure.status) =>
            {
                tracing::warn!(
                    "Channel {channel_id} unreachable for {event_id} ({}), \
                     falling back to default",
                    failure.message
                );
                self.send_embed(&self.default_channel_id, payload)
                    .await
                    .map_err(Into::into)
            }
            Err(failure) => Err(failure.into()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_body_shape() {
        let body = embed_body("🏇 Fast Lad\n💰 Units: 2.0u");
        let embeds = body["embeds"].as_array().unwrap();
        assert_eq!(embeds.len(), 1);
        assert_eq!(embeds[0]["color"], 0x808080);
        assert!(embeds[0]["description"].as_str().unwrap().contains("Fast Lad"));
    }

    #[test]
    fn test_bad_token_rejected_at_build() {
        assert!(DiscordBotSink::new("bad\ntoken", "123").is_err());
    }

    #[test]
    fn test_fallback_only_for_unreachable_channel() {
        use reqwest::StatusCode;
        assert!(is_unreachable_channel(Some(StatusCode::FORBIDDEN)));
        assert!(is_unreachable_channel(Some(StatusCode::NOT_FOUND)));
        // Transient failures must not trigger a second send.
        assert!(!is_unreachable_channel(Some(StatusCode::TOO_MANY_REQUESTS)));
        assert!(!is_unreachable_channel(Some(StatusCode::INTERNAL_SERVER_ERROR)));
        assert!(!is_unreachable_channel(Some(StatusCode::BAD_REQUEST)));
        assert!(!is_unreachable_channel(None));
    }
}
