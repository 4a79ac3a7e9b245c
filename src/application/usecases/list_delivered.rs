use std::sync::Arc;

use crate::domain::{models::Message, repositories::MessageRepository};

/// Reads delivery history straight from the store, bypassing the dispatch
/// pipeline entirely.
pub struct ListDeliveredMessagesUseCase {
    repo: Arc<dyn MessageRepository>,
}

impl ListDeliveredMessagesUseCase {
    pub fn new(repo: Arc<dyn MessageRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self) -> anyhow::Result<Vec<Message>> {
        self.repo.fetch_delivered().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::infrastructure::repositories::in_memory::InMemoryMessageRepository;

    #[tokio::test]
    async fn lists_most_recently_delivered_first() {
        let repo = Arc::new(InMemoryMessageRepository::new());
        let first = repo.insert("a", "1").await.unwrap();
        let second = repo.insert("b", "2").await.unwrap();
        repo.mark_delivered(first.id, "delivery-1").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        repo.mark_delivered(second.id, "delivery-2").await.unwrap();

        let usecase = ListDeliveredMessagesUseCase::new(repo);
        let delivered = usecase.execute().await.unwrap();

        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].id, second.id);
        assert_eq!(delivered[1].id, first.id);
    }
}
