use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{info, warn};

use super::{DeliveryStatus, NotifySink};
use crate::format::NotificationPayload;

/// Fallback backoff when a 429 arrives without a usable Retry-After header.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(5);

/// Discord incoming-webhook notification sink.
pub struct DiscordWebhook {
    webhook_url: String,
    http: reqwest::Client,
}

impl DiscordWebhook {
    pub fn new(webhook_url: String) -> Self {
        Self {
            webhook_url,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl NotifySink for DiscordWebhook {
    async fn deliver(&self, payload: &NotificationPayload) -> anyhow::Result<DeliveryStatus> {
        let resp = self
            .http
            .post(&self.webhook_url)
            .json(payload)
            .send()
            .await
            .context("Discord webhook request failed")?;

        let status = resp.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<f64>().ok())
                .map(Duration::from_secs_f64)
                .unwrap_or(DEFAULT_RETRY_AFTER);
            return Ok(DeliveryStatus::RateLimited { retry_after });
        }

        if status.is_success() {
            info!("Posted to Discord successfully");
            return Ok(DeliveryStatus::Delivered);
        }

        let body = resp.text().await.unwrap_or_default();
        warn!(status = %status, body = %body, "Discord webhook returned non-success");
        Ok(DeliveryStatus::Failed {
            status: status.as_u16(),
        })
    }
}
