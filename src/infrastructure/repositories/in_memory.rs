use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::{
    models::Message,
    repositories::{DeliveryCache, MessageRepository},
};

#[derive(Default)]
pub struct InMemoryMessageRepository {
    state: Arc<RwLock<MessageTable>>,
}

#[derive(Default)]
struct MessageTable {
    next_id: i64,
    messages: Vec<Message>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a message with an explicit creation timestamp, for callers that
    /// depend on fetch order.
    pub async fn insert_at(&self, to: &str, content: &str, created_at: DateTime<Utc>) -> Message {
        let mut table = self.state.write().await;
        table.next_id += 1;
        let message = Message {
            id: table.next_id,
            to: to.to_string(),
            content: content.to_string(),
            delivered: false,
            created_at,
            delivered_at: None,
            delivery_id: None,
        };
        table.messages.push(message.clone());
        message
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn insert(&self, to: &str, content: &str) -> anyhow::Result<Message> {
        Ok(self.insert_at(to, content, Utc::now()).await)
    }

    async fn fetch_pending(&self, limit: i64) -> anyhow::Result<Vec<Message>> {
        let table = self.state.read().await;
        let mut pending: Vec<Message> = table
            .messages
            .iter()
            .filter(|m| !m.delivered)
            .cloned()
            .collect();
        pending.sort_by_key(|m| m.created_at);
        pending.truncate(limit.max(0) as usize);
        Ok(pending)
    }

    async fn mark_delivered(&self, id: i64, delivery_id: &str) -> anyhow::Result<()> {
        let mut table = self.state.write().await;
        let message = table
            .messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| anyhow::anyhow!("message {id} not found"))?;
        if message.delivered {
            return Ok(());
        }
        message.delivered = true;
        message.delivered_at = Some(Utc::now());
        message.delivery_id = Some(delivery_id.to_string());
        Ok(())
    }

    async fn fetch_delivered(&self) -> anyhow::Result<Vec<Message>> {
        let table = self.state.read().await;
        let mut delivered: Vec<Message> = table
            .messages
            .iter()
            .filter(|m| m.delivered)
            .cloned()
            .collect();
        delivered.sort_by(|a, b| b.delivered_at.cmp(&a.delivered_at));
        Ok(delivered)
    }
}

#[derive(Default)]
pub struct InMemoryDeliveryCache {
    entries: Arc<RwLock<Vec<(String, DateTime<Utc>, Duration)>>>,
}

impl InMemoryDeliveryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<(String, DateTime<Utc>, Duration)> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl DeliveryCache for InMemoryDeliveryCache {
    async fn record_delivery(
        &self,
        delivery_id: &str,
        delivered_at: DateTime<Utc>,
        ttl: Duration,
    ) -> anyhow::Result<()> {
        self.entries
            .write()
            .await
            .push((delivery_id.to_string(), delivered_at, ttl));
        Ok(())
    }
}
