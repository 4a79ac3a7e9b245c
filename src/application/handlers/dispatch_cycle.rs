use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::{
    application::services::delivery::DeliveryClient,
    domain::{
        models::{DispatchOutcome, Message},
        repositories::{DeliveryCache, MessageRepository},
    },
};

const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// One full pass of "find pending work, attempt it, record results".
/// Holds no background state; the scheduler invokes it once per tick.
pub struct DispatchCycle {
    repo: Arc<dyn MessageRepository>,
    cache: Arc<dyn DeliveryCache>,
    client: Arc<dyn DeliveryClient>,
    batch_size: i64,
    max_content_length: usize,
}

/// Per-cycle tally, used for logging and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub delivered: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl DispatchCycle {
    pub fn new(
        repo: Arc<dyn MessageRepository>,
        cache: Arc<dyn DeliveryCache>,
        client: Arc<dyn DeliveryClient>,
        batch_size: i64,
        max_content_length: usize,
    ) -> Self {
        Self {
            repo,
            cache,
            client,
            batch_size,
            max_content_length,
        }
    }

    /// Only the batch fetch can fail the whole pass; every per-message
    /// failure is logged and the batch continues with the next message.
    pub async fn run(&self) -> anyhow::Result<CycleReport> {
        let batch = self.repo.fetch_pending(self.batch_size).await?;
        if batch.is_empty() {
            return Ok(CycleReport::default());
        }

        let mut report = CycleReport {
            fetched: batch.len(),
            ..CycleReport::default()
        };

        for message in &batch {
            match self.dispatch_one(message).await {
                DispatchOutcome::Delivered | DispatchOutcome::CacheWriteFailed => {
                    report.delivered += 1
                }
                DispatchOutcome::SkippedTooLong => report.skipped += 1,
                DispatchOutcome::DeliveryFailed | DispatchOutcome::StoreUpdateFailed => {
                    report.failed += 1
                }
            }
        }

        Ok(report)
    }

    async fn dispatch_one(&self, message: &Message) -> DispatchOutcome {
        if message.content.len() > self.max_content_length {
            warn!(
                id = message.id,
                length = message.content.len(),
                max = self.max_content_length,
                "content too long, skipping"
            );
            return DispatchOutcome::SkippedTooLong;
        }

        let delivery_id = match self.client.deliver(&message.to, &message.content).await {
            Ok(id) => id,
            Err(err) => {
                warn!(id = message.id, error = %err, "delivery failed, message stays pending");
                return DispatchOutcome::DeliveryFailed;
            }
        };

        if let Err(err) = self.repo.mark_delivered(message.id, &delivery_id).await {
            // The endpoint accepted the message but the store still shows it
            // pending, so the next cycle will send it again.
            error!(
                id = message.id,
                %delivery_id,
                error = %err,
                "failed to persist delivered state, duplicate send possible"
            );
            return DispatchOutcome::StoreUpdateFailed;
        }

        if let Err(err) = self
            .cache
            .record_delivery(&delivery_id, Utc::now(), CACHE_TTL)
            .await
        {
            warn!(id = message.id, %delivery_id, error = %err, "failed to cache delivery id");
            return DispatchOutcome::CacheWriteFailed;
        }

        info!(id = message.id, %delivery_id, "message delivered");
        DispatchOutcome::Delivered
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{DateTime, Duration as ChronoDuration, Utc};
    use tokio::sync::RwLock;
    use uuid::Uuid;

    use super::*;
    use crate::{
        domain::errors::DeliveryError,
        infrastructure::repositories::in_memory::{
            InMemoryDeliveryCache, InMemoryMessageRepository,
        },
    };

    #[derive(Default)]
    struct RecordingClient {
        recipients: RwLock<Vec<String>>,
    }

    #[async_trait]
    impl DeliveryClient for RecordingClient {
        async fn deliver(&self, to: &str, _content: &str) -> Result<String, DeliveryError> {
            self.recipients.write().await.push(to.to_string());
            Ok(Uuid::new_v4().to_string())
        }
    }

    #[derive(Default)]
    struct FailingClient {
        attempts: RwLock<u32>,
    }

    #[async_trait]
    impl DeliveryClient for FailingClient {
        async fn deliver(&self, _to: &str, _content: &str) -> Result<String, DeliveryError> {
            *self.attempts.write().await += 1;
            Err(DeliveryError::Status(500))
        }
    }

    /// Delegates everything to the in-memory store except mark_delivered,
    /// which always fails.
    struct BrokenMarkRepository {
        inner: Arc<InMemoryMessageRepository>,
    }

    #[async_trait]
    impl MessageRepository for BrokenMarkRepository {
        async fn insert(&self, to: &str, content: &str) -> anyhow::Result<Message> {
            self.inner.insert(to, content).await
        }

        async fn fetch_pending(&self, limit: i64) -> anyhow::Result<Vec<Message>> {
            self.inner.fetch_pending(limit).await
        }

        async fn mark_delivered(&self, _id: i64, _delivery_id: &str) -> anyhow::Result<()> {
            anyhow::bail!("store unavailable")
        }

        async fn fetch_delivered(&self) -> anyhow::Result<Vec<Message>> {
            self.inner.fetch_delivered().await
        }
    }

    struct BrokenCache;

    #[async_trait]
    impl DeliveryCache for BrokenCache {
        async fn record_delivery(
            &self,
            _delivery_id: &str,
            _delivered_at: DateTime<Utc>,
            _ttl: std::time::Duration,
        ) -> anyhow::Result<()> {
            anyhow::bail!("cache unavailable")
        }
    }

    fn cycle_with(
        repo: Arc<dyn MessageRepository>,
        cache: Arc<dyn DeliveryCache>,
        client: Arc<dyn DeliveryClient>,
    ) -> DispatchCycle {
        DispatchCycle::new(repo, cache, client, 2, 160)
    }

    #[tokio::test]
    async fn delivers_pending_messages_and_marks_them() {
        let repo = Arc::new(InMemoryMessageRepository::new());
        let cache = Arc::new(InMemoryDeliveryCache::new());
        let client = Arc::new(RecordingClient::default());
        repo.insert("+905551111111", "hello").await.unwrap();

        let cycle = cycle_with(repo.clone(), cache.clone(), client.clone());
        let report = cycle.run().await.unwrap();

        assert_eq!(report.fetched, 1);
        assert_eq!(report.delivered, 1);
        assert!(repo.fetch_pending(10).await.unwrap().is_empty());

        let delivered = repo.fetch_delivered().await.unwrap();
        assert_eq!(delivered.len(), 1);
        assert!(delivered[0].delivered);
        assert!(delivered[0].delivery_id.is_some());
        assert!(delivered[0].delivered_at.is_some());
        assert_eq!(cache.entries().await.len(), 1);
    }

    #[tokio::test]
    async fn empty_batch_is_a_noop() {
        let repo = Arc::new(InMemoryMessageRepository::new());
        let cycle = cycle_with(
            repo,
            Arc::new(InMemoryDeliveryCache::new()),
            Arc::new(RecordingClient::default()),
        );

        let report = cycle.run().await.unwrap();
        assert_eq!(report, CycleReport::default());
    }

    #[tokio::test]
    async fn over_long_content_is_skipped_and_stays_pending() {
        let repo = Arc::new(InMemoryMessageRepository::new());
        let client = Arc::new(RecordingClient::default());
        repo.insert("+905551111111", &"x".repeat(500)).await.unwrap();

        let cycle = cycle_with(
            repo.clone(),
            Arc::new(InMemoryDeliveryCache::new()),
            client.clone(),
        );
        let report = cycle.run().await.unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.delivered, 0);
        assert!(client.recipients.read().await.is_empty());
        // Still eligible for the next cycle.
        assert_eq!(repo.fetch_pending(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn skip_does_not_abort_the_rest_of_the_batch() {
        let repo = Arc::new(InMemoryMessageRepository::new());
        let client = Arc::new(RecordingClient::default());
        let t0 = Utc::now();
        repo.insert_at("+905551111111", "hi", t0).await;
        repo.insert_at("+905552222222", &"x".repeat(500), t0 + ChronoDuration::seconds(1))
            .await;

        let cycle = cycle_with(
            repo.clone(),
            Arc::new(InMemoryDeliveryCache::new()),
            client.clone(),
        );
        let report = cycle.run().await.unwrap();

        assert_eq!(report.delivered, 1);
        assert_eq!(report.skipped, 1);

        let delivered = repo.fetch_delivered().await.unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].to, "+905551111111");
        assert!(delivered[0].delivery_id.is_some());
        assert!(delivered[0].delivered_at.unwrap() >= t0);

        let pending = repo.fetch_pending(10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].to, "+905552222222");
    }

    #[tokio::test]
    async fn failed_delivery_leaves_message_pending_for_next_cycle() {
        let repo = Arc::new(InMemoryMessageRepository::new());
        let client = Arc::new(FailingClient::default());
        repo.insert("+905551111111", "hello").await.unwrap();

        let cycle = cycle_with(
            repo.clone(),
            Arc::new(InMemoryDeliveryCache::new()),
            client.clone(),
        );

        let report = cycle.run().await.unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(repo.fetch_pending(10).await.unwrap().len(), 1);

        // The next cycle re-selects the same message.
        cycle.run().await.unwrap();
        assert_eq!(*client.attempts.read().await, 2);
    }

    #[tokio::test]
    async fn cycle_never_exceeds_batch_size() {
        let repo = Arc::new(InMemoryMessageRepository::new());
        let client = Arc::new(RecordingClient::default());
        for i in 0..5 {
            repo.insert("+905551111111", &format!("message {i}"))
                .await
                .unwrap();
        }

        let cycle = cycle_with(
            repo.clone(),
            Arc::new(InMemoryDeliveryCache::new()),
            client.clone(),
        );
        let report = cycle.run().await.unwrap();

        assert_eq!(report.fetched, 2);
        assert_eq!(client.recipients.read().await.len(), 2);
        assert_eq!(repo.fetch_pending(10).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn batch_is_attempted_oldest_first() {
        let repo = Arc::new(InMemoryMessageRepository::new());
        let client = Arc::new(RecordingClient::default());
        let t0 = Utc::now();
        repo.insert_at("third", "c", t0 + ChronoDuration::seconds(2)).await;
        repo.insert_at("first", "a", t0).await;
        repo.insert_at("second", "b", t0 + ChronoDuration::seconds(1)).await;

        let cycle = cycle_with(
            repo.clone(),
            Arc::new(InMemoryDeliveryCache::new()),
            client.clone(),
        );
        cycle.run().await.unwrap();

        let recipients = client.recipients.read().await;
        assert_eq!(*recipients, vec!["first".to_string(), "second".to_string()]);
    }

    #[tokio::test]
    async fn store_update_failure_keeps_message_pending() {
        let inner = Arc::new(InMemoryMessageRepository::new());
        inner.insert("+905551111111", "hello").await.unwrap();
        let repo = Arc::new(BrokenMarkRepository { inner: inner.clone() });

        let cycle = cycle_with(
            repo,
            Arc::new(InMemoryDeliveryCache::new()),
            Arc::new(RecordingClient::default()),
        );
        let report = cycle.run().await.unwrap();

        // The endpoint accepted the message, the store did not record it:
        // the message is still pending and will be sent again.
        assert_eq!(report.failed, 1);
        assert_eq!(inner.fetch_pending(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cache_failure_does_not_undo_delivery() {
        let repo = Arc::new(InMemoryMessageRepository::new());
        repo.insert("+905551111111", "hello").await.unwrap();

        let cycle = cycle_with(
            repo.clone(),
            Arc::new(BrokenCache),
            Arc::new(RecordingClient::default()),
        );
        let report = cycle.run().await.unwrap();

        assert_eq!(report.delivered, 1);
        assert_eq!(repo.fetch_delivered().await.unwrap().len(), 1);
        assert!(repo.fetch_pending(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delivered_messages_are_never_reselected() {
        let repo = Arc::new(InMemoryMessageRepository::new());
        let client = Arc::new(RecordingClient::default());
        repo.insert("+905551111111", "hello").await.unwrap();

        let cycle = cycle_with(
            repo.clone(),
            Arc::new(InMemoryDeliveryCache::new()),
            client.clone(),
        );
        cycle.run().await.unwrap();
        let report = cycle.run().await.unwrap();

        assert_eq!(report.fetched, 0);
        assert_eq!(client.recipients.read().await.len(), 1);
    }
}
