//! Shared traits.

use crate::conversation::Conversation;
use crate::engine::types::{EngineError, GeneratedResponse};
use crate::preprocessing::RequestTopic;

/// Produces the tagged responses for one student question.
///
/// The query is appended to `context` as a user turn before any model call.
#[async_trait::async_trait]
pub trait Responder: Send + Sync {
    async fn respond(
        &self,
        query: &str,
        context: &mut Conversation,
        topic: &RequestTopic,
    ) -> Result<Vec<GeneratedResponse>, EngineError>;
}
