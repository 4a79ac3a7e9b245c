use async_trait::async_trait;

use crate::domain::errors::DeliveryError;

#[async_trait]
pub trait DeliveryClient: Send + Sync {
    /// Performs exactly one delivery attempt. On acceptance returns a
    /// delivery identifier; any failure is returned without retrying.
    async fn deliver(&self, to: &str, content: &str) -> Result<String, DeliveryError>;
}
