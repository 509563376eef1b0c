//! Shared structs.

use crate::llm::LlmError;
use crate::personalities::Persona;
use crate::preprocessing::ValidationError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// One persona's answer. Output only.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedResponse {
    pub text: String,
    pub persona: Persona,
    pub produced_at: DateTime<Utc>,
}

impl GeneratedResponse {
    pub fn new(persona: Persona, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            persona,
            produced_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonaFailure {
    pub persona: Persona,
    pub error: LlmError,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Remote model call failed: {0}")]
    Remote(#[from] LlmError),

    #[error("All persona calls failed: {}", summarize(.failures))]
    AllPersonasFailed { failures: Vec<PersonaFailure> },
}

fn summarize(failures: &[PersonaFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.persona.tag(), f.error))
        .collect::<Vec<_>>()
        .join("; ")
}
