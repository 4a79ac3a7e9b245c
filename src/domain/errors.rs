use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("endpoint returned status {0}")]
    Status(u16),
    #[error("request timed out")]
    Timeout,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("failed to serialize payload: {0}")]
    Serialization(String),
}
