use std::sync::Arc;

use crate::domain::{models::Message, repositories::MessageRepository};

pub struct SubmitMessageRequest {
    pub to: String,
    pub content: String,
}

/// Queues a message for delivery. The dispatch pipeline picks it up on the
/// next cycle; nothing is sent synchronously.
pub struct SubmitMessageUseCase {
    repo: Arc<dyn MessageRepository>,
}

impl SubmitMessageUseCase {
    pub fn new(repo: Arc<dyn MessageRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, request: SubmitMessageRequest) -> anyhow::Result<Message> {
        if request.to.trim().is_empty() {
            anyhow::bail!("recipient must not be empty");
        }
        if request.content.is_empty() {
            anyhow::bail!("content must not be empty");
        }

        self.repo.insert(&request.to, &request.content).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::infrastructure::repositories::in_memory::InMemoryMessageRepository;

    #[tokio::test]
    async fn queues_message_in_undelivered_state() {
        let repo = Arc::new(InMemoryMessageRepository::new());
        let usecase = SubmitMessageUseCase::new(repo.clone());

        let message = usecase
            .execute(SubmitMessageRequest {
                to: "+905551111111".to_string(),
                content: "hello".to_string(),
            })
            .await
            .unwrap();

        assert!(!message.delivered);
        assert!(message.delivery_id.is_none());
        assert_eq!(repo.fetch_pending(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejects_empty_recipient() {
        let repo = Arc::new(InMemoryMessageRepository::new());
        let usecase = SubmitMessageUseCase::new(repo);

        let result = usecase
            .execute(SubmitMessageRequest {
                to: "  ".to_string(),
                content: "hello".to_string(),
            })
            .await;

        assert!(result.is_err());
    }
}
