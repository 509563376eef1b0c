pub mod cleaner;
pub mod context;

pub use cleaner::{Cleaner, CleanerError};
pub use context::RequestTopic;

use crate::conversation::ConversationError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error(transparent)]
    Message(#[from] CleanerError),
    #[error("Invalid conversation turn: {0}")]
    Conversation(#[from] ConversationError),
    #[error("Field '{field}' too long: {length} > {max} characters")]
    FieldTooLong {
        field: &'static str,
        length: usize,
        max: usize,
    },
    #[error("Conversation history too long: {length} > {max} turns")]
    HistoryTooLong { length: usize, max: usize },
}
