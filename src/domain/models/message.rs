use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A unit of outbound content. Created undelivered; `delivered` flips to
/// true exactly once, together with `delivered_at` and `delivery_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub to: String,
    pub content: String,
    pub delivered: bool,
    pub created_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub delivery_id: Option<String>,
}

/// Per-attempt result of pushing one message through the dispatch pipeline.
/// Never persisted; only decides whether the pipeline advances for that
/// message within the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    SkippedTooLong,
    DeliveryFailed,
    StoreUpdateFailed,
    CacheWriteFailed,
    Delivered,
}
