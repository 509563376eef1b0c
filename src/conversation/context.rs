//! Ordered, bounded conversation log.

use crate::conversation::{ConversationError, Role, Turn};
use crate::llm::{Content, RemoteRole};

pub const DEFAULT_MAX_TURNS: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    turns: Vec<Turn>,
    max_turns: usize,
}

impl Conversation {
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: Vec::new(),
            max_turns,
        }
    }

    /// Builds a conversation from existing turns, failing if they exceed the bound.
    pub fn from_turns(turns: Vec<Turn>, max_turns: usize) -> Result<Self, ConversationError> {
        if turns.len() > max_turns {
            return Err(ConversationError::CapacityReached { max: max_turns });
        }
        Ok(Self { turns, max_turns })
    }

    /// Appends a turn. At capacity the log is left untouched.
    pub fn append(&mut self, turn: Turn) -> Result<(), ConversationError> {
        if self.turns.len() >= self.max_turns {
            return Err(ConversationError::CapacityReached {
                max: self.max_turns,
            });
        }
        self.turns.push(turn);
        Ok(())
    }

    /// The last `n` turns in insertion order.
    pub fn recent(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn latest_user_turn(&self) -> Option<&Turn> {
        self.turns.iter().rev().find(|t| t.role() == Role::User)
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    pub fn to_remote_format(&self) -> Vec<Content> {
        to_remote_format(&self.turns)
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TURNS)
    }
}

/// Maps turns onto the provider's two-role format. Persona metadata is dropped.
pub fn to_remote_format(turns: &[Turn]) -> Vec<Content> {
    turns
        .iter()
        .map(|turn| {
            let role = match turn.role() {
                Role::User => RemoteRole::User,
                Role::Assistant | Role::System => RemoteRole::Model,
            };
            Content::text(role, turn.content())
        })
        .collect()
}
