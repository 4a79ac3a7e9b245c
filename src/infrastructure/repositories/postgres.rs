use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Postgres};

use crate::domain::{models::Message, repositories::MessageRepository};

pub type PgPool = Pool<Postgres>;

#[derive(Clone)]
pub struct PostgresMessageRepository {
    pool: PgPool,
}

impl PostgresMessageRepository {
    pub fn new(pool: PgPool) -> Arc<Self> {
        Arc::new(Self { pool })
    }
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    async fn insert(&self, to: &str, content: &str) -> anyhow::Result<Message> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            INSERT INTO messages (recipient, content, delivered, created_at)
            VALUES ($1, $2, false, NOW())
            RETURNING id, recipient, content, delivered, created_at, delivered_at, delivery_id
            "#,
        )
        .bind(to)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        Ok(record.into())
    }

    async fn fetch_pending(&self, limit: i64) -> anyhow::Result<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT id, recipient, content, delivered, created_at, delivered_at, delivery_id
            FROM messages
            WHERE delivered = false
            ORDER BY created_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Message::from).collect())
    }

    async fn mark_delivered(&self, id: i64, delivery_id: &str) -> anyhow::Result<()> {
        // The delivered guard makes a repeat call a no-op, so a message can
        // never be re-stamped with a later timestamp or a different id.
        sqlx::query(
            r#"
            UPDATE messages
            SET delivered = true, delivered_at = NOW(), delivery_id = $1
            WHERE id = $2 AND delivered = false
            "#,
        )
        .bind(delivery_id)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn fetch_delivered(&self) -> anyhow::Result<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT id, recipient, content, delivered, created_at, delivered_at, delivery_id
            FROM messages
            WHERE delivered = true
            ORDER BY delivered_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Message::from).collect())
    }
}

#[derive(FromRow)]
struct MessageRecord {
    id: i64,
    recipient: String,
    content: String,
    delivered: bool,
    created_at: DateTime<Utc>,
    delivered_at: Option<DateTime<Utc>>,
    delivery_id: Option<String>,
}

impl From<MessageRecord> for Message {
    fn from(value: MessageRecord) -> Self {
        Self {
            id: value.id,
            to: value.recipient,
            content: value.content,
            delivered: value.delivered,
            created_at: value.created_at,
            delivered_at: value.delivered_at,
            delivery_id: value.delivery_id,
        }
    }
}
