//! Steps shared by every responder.

use crate::conversation::{Conversation, Turn};
use crate::engine::types::EngineError;
use crate::preprocessing::{Cleaner, RequestTopic, ValidationError};

/// Validates the query and records it as the newest user turn. Returns the cleaned text.
pub fn append_query(query: &str, context: &mut Conversation) -> Result<String, EngineError> {
    let cleaned = Cleaner::clean(query).map_err(ValidationError::from)?;
    let turn = Turn::user(&cleaned).map_err(ValidationError::from)?;
    context.append(turn).map_err(ValidationError::from)?;
    Ok(cleaned)
}

/// Turns before the one just appended by [`append_query`].
pub fn prior_turns(context: &Conversation) -> &[Turn] {
    let turns = context.turns();
    &turns[..turns.len().saturating_sub(1)]
}

/// Instruction prefix, optional subject/topic lines, then the question.
pub fn compose_prompt(instructions: &str, topic: &RequestTopic, question: &str) -> String {
    format!(
        "{}\n\n{}Student question: {}",
        instructions,
        topic.prompt_lines(),
        question
    )
}
