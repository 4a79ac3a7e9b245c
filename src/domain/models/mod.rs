mod message;

pub use message::{DispatchOutcome, Message};
