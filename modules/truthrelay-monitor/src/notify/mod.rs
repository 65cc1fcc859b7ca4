mod discord;

pub use discord::DiscordWebhook;

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::format::NotificationPayload;

/// Outcome of a single delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Delivered,
    /// The sink asked us to back off for the given duration.
    RateLimited { retry_after: Duration },
    /// Non-rate-limit rejection. Not retried.
    Failed { status: u16 },
}

/// Pluggable notification sink. One call is one delivery attempt; transport
/// errors surface as `Err`, HTTP-level outcomes as `DeliveryStatus`.
#[async_trait]
pub trait NotifySink: Send + Sync {
    async fn deliver(&self, payload: &NotificationPayload) -> anyhow::Result<DeliveryStatus>;
}

pub const MAX_DELIVERY_ATTEMPTS: u32 = 3;

/// Deliver with bounded retry, honoring the sink's requested backoff. Only
/// rate limits are retried; other failures return immediately.
pub async fn deliver_with_retry(
    sink: &dyn NotifySink,
    payload: &NotificationPayload,
) -> anyhow::Result<DeliveryStatus> {
    for attempt in 1..=MAX_DELIVERY_ATTEMPTS {
        match sink.deliver(payload).await? {
            DeliveryStatus::RateLimited { retry_after } if attempt < MAX_DELIVERY_ATTEMPTS => {
                warn!(
                    attempt,
                    wait_secs = retry_after.as_secs(),
                    "Delivery rate limited, backing off before retry"
                );
                tokio::time::sleep(retry_after + Duration::from_secs(1)).await;
            }
            status => return Ok(status),
        }
    }
    unreachable!("final attempt always returns")
}
