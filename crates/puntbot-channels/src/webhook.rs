//! Discord webhook channel — stateless HTTP POST delivery.

use std::time::Duration;

use async_trait::async_trait;

use puntbot_core::error::{PuntBotError, Result};
use puntbot_core::traits::DeliverySink;
use puntbot_core::types::EventId;

const TIMEOUT: Duration = Duration::from_secs(10);
// Webhook embeds historically use the decimal value, not hex.
const EMBED_COLOR: u32 = 808080;

/// Stateless webhook transport: POST a JSON embed body to a fixed URL.
/// Discord answers 204 No Content on success; anything else (or a network
/// error) is a delivery failure.
pub struct DiscordWebhookSink {
    url: String,
    client: reqwest::Client,
}

impl DiscordWebhookSink {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

/// Webhook payload: `{embeds: [{title, color, description}]}`.
fn webhook_body(description: &str) -> serde_json::Value {
    serde_json::json!({
        "embeds": [{
            "title": "",
            "color": EMBED_COLOR,
            "description": description,
        }]
    })
}

#[async_trait]
impl DeliverySink for DiscordWebhookSink {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn deliver(
        &self,
        payload: &str,
        event_id: &EventId,
        _destination: Option<&str>,
    ) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&webhook_body(payload))
            .timeout(TIMEOUT)
            .send()
            .await
            .map_err(|e| PuntBotError::channel(format!("webhook request failed: {e}")))?;

        let status = response.status();
        if status != reqwest::StatusCode::NO_CONTENT {
            let text = response.text().await.unwrap_or_default();
            return Err(PuntBotError::channel(format!(
                "webhook returned {status}: {text}"
            )));
        }
        tracing::info!("Message sent for {event_id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_body_shape() {
        let body = webhook_body("🏇 Fast Lad");
        let embed = &body["embeds"][0];
        assert_eq!(embed["title"], "");
        assert_eq!(embed["color"], 808080);
        assert_eq!(embed["description"], "🏇 Fast Lad");
    }
}
