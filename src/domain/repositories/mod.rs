use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::models::Message;

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persists a new undelivered message. The store assigns the identifier
    /// and creation timestamp.
    async fn insert(&self, to: &str, content: &str) -> anyhow::Result<Message>;

    /// Undelivered messages, oldest-created first, at most `limit` items.
    async fn fetch_pending(&self, limit: i64) -> anyhow::Result<Vec<Message>>;

    /// Sets delivered = true with the current timestamp and the given
    /// delivery identifier. A second call for the same id is a no-op.
    async fn mark_delivered(&self, id: i64, delivery_id: &str) -> anyhow::Result<()>;

    /// All delivered messages, most-recently-delivered first.
    async fn fetch_delivered(&self) -> anyhow::Result<Vec<Message>>;
}

#[async_trait]
pub trait DeliveryCache: Send + Sync {
    /// Best-effort record of a delivery identifier with an expiry. Callers
    /// treat failure as non-fatal.
    async fn record_delivery(
        &self,
        delivery_id: &str,
        delivered_at: DateTime<Utc>,
        ttl: Duration,
    ) -> anyhow::Result<()>;
}
