//! High-level coordinator: query → one model call per persona → ordered responses.

use crate::conversation::Conversation;
use crate::engine::core::{append_query, compose_prompt, prior_turns};
use crate::engine::traits::Responder;
use crate::engine::types::{EngineError, GeneratedResponse, PersonaFailure};
use crate::llm::ModelClient;
use crate::personalities::Persona;
use crate::preprocessing::RequestTopic;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub struct PersonaOrchestrator {
    client: Arc<dyn ModelClient>,
}

impl PersonaOrchestrator {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }

    pub fn build_prompt(persona: Persona, topic: &RequestTopic, question: &str) -> String {
        compose_prompt(persona.instructions(), topic, question)
    }

    /// Runs both personas concurrently. One persona failing is tolerated; both failing is not.
    #[instrument(skip_all, fields(query_len = query.len(), history_len = context.len()))]
    pub async fn execute(
        &self,
        query: &str,
        context: &mut Conversation,
        topic: &RequestTopic,
    ) -> Result<Vec<GeneratedResponse>, EngineError> {
        let question = append_query(query, context)?;
        let history = prior_turns(context);

        // join_all yields in input order, so output follows Persona::ALL.
        let calls = Persona::ALL.iter().map(|&persona| {
            let prompt = Self::build_prompt(persona, topic, &question);
            async move { (persona, self.client.generate(&prompt, history).await) }
        });
        let outcomes = join_all(calls).await;

        let mut responses = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for (persona, outcome) in outcomes {
            match outcome {
                Ok(text) => responses.push(GeneratedResponse::new(persona, text)),
                Err(error) => {
                    warn!(persona = persona.tag(), error = %error, "Persona call failed");
                    failures.push(PersonaFailure { persona, error });
                }
            }
        }

        if responses.is_empty() {
            return Err(EngineError::AllPersonasFailed { failures });
        }

        info!(
            succeeded = responses.len(),
            failed = failures.len(),
            "Persona responses generated"
        );
        Ok(responses)
    }
}

#[async_trait::async_trait]
impl Responder for PersonaOrchestrator {
    async fn respond(
        &self,
        query: &str,
        context: &mut Conversation,
        topic: &RequestTopic,
    ) -> Result<Vec<GeneratedResponse>, EngineError> {
        self.execute(query, context, topic).await
    }
}
