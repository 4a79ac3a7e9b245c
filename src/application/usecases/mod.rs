pub mod list_delivered;
pub mod submit_message;
