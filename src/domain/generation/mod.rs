pub mod dto;
pub mod error;
pub mod service;

pub use dto::{ChatMessage, ChatRole, CompletionRequest};
pub use error::GenerationError;
pub use service::{Generator, RetryPolicy, TransportRetry};
