use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;

use crate::domain::repositories::DeliveryCache;

pub struct RedisDeliveryCache {
    client: redis::Client,
}

impl RedisDeliveryCache {
    /// Opens the client and verifies the server is reachable.
    pub async fn connect(url: &str) -> anyhow::Result<Arc<Self>> {
        let client = redis::Client::open(url)?;
        let mut conn = client.get_async_connection().await?;
        redis::cmd("PING").query_async::<_, ()>(&mut conn).await?;
        Ok(Arc::new(Self { client }))
    }
}

#[async_trait]
impl DeliveryCache for RedisDeliveryCache {
    async fn record_delivery(
        &self,
        delivery_id: &str,
        delivered_at: DateTime<Utc>,
        ttl: Duration,
    ) -> anyhow::Result<()> {
        let mut conn = self.client.get_async_connection().await?;
        let key = format!("message:{delivery_id}");
        let _: () = conn
            .set_ex(key, delivered_at.to_rfc3339(), ttl.as_secs() as usize)
            .await?;
        Ok(())
    }
}
