//! Conversation turns, with optional persona metadata.

use crate::conversation::ConversationError;
use crate::personalities::Persona;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        };
        f.write_str(label)
    }
}

/// One entry of a conversation. Content is trimmed and never empty.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", try_from = "TurnRecord")]
pub struct Turn {
    role: Role,
    content: String,
    created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    persona: Option<Persona>,
}

impl Turn {
    /// Upper bound on content, in characters.
    pub const MAX_CONTENT_LENGTH: usize = 5000;

    pub fn new(role: Role, content: impl AsRef<str>) -> Result<Self, ConversationError> {
        Self::with_timestamp(role, content, Utc::now(), None)
    }

    pub fn user(content: impl AsRef<str>) -> Result<Self, ConversationError> {
        Self::new(Role::User, content)
    }

    pub fn from_persona(persona: Persona, content: impl AsRef<str>) -> Result<Self, ConversationError> {
        Self::with_timestamp(Role::Assistant, content, Utc::now(), Some(persona))
    }

    pub fn with_timestamp(
        role: Role,
        content: impl AsRef<str>,
        created_at: DateTime<Utc>,
        persona: Option<Persona>,
    ) -> Result<Self, ConversationError> {
        let content = content.as_ref().trim();
        if content.is_empty() {
            return Err(ConversationError::EmptyContent);
        }
        let length = content.chars().count();
        if length > Self::MAX_CONTENT_LENGTH {
            return Err(ConversationError::ContentTooLong {
                length,
                max: Self::MAX_CONTENT_LENGTH,
            });
        }

        Ok(Self {
            role,
            content: content.to_string(),
            created_at,
            persona,
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn persona(&self) -> Option<Persona> {
        self.persona
    }
}

/// Unvalidated shape of a turn as it arrives over the wire.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TurnRecord {
    role: Role,
    content: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    persona: Option<Persona>,
}

impl TryFrom<TurnRecord> for Turn {
    type Error = ConversationError;

    fn try_from(record: TurnRecord) -> Result<Self, Self::Error> {
        Turn::with_timestamp(record.role, record.content, record.created_at, record.persona)
    }
}
