//! Conversation history replayed from the client.

pub mod context;
pub mod message;

pub use context::{to_remote_format, Conversation, DEFAULT_MAX_TURNS};
pub use message::{Role, Turn};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversationError {
    #[error("Turn content cannot be empty")]
    EmptyContent,
    #[error("Turn content too long: {length} > {max} characters")]
    ContentTooLong { length: usize, max: usize },
    #[error("Conversation is full: at most {max} turns")]
    CapacityReached { max: usize },
}
