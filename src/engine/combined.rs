//! Single-call path: one prompt asking for both sections, split afterwards.

use crate::conversation::Conversation;
use crate::engine::core::{append_query, compose_prompt, prior_turns};
use crate::engine::traits::Responder;
use crate::engine::types::{EngineError, GeneratedResponse};
use crate::llm::ModelClient;
use crate::personalities::Persona;
use crate::postprocessing::parser::{DEFAULT_EXAMPLE_MARKER, DEFAULT_EXPLANATION_MARKER};
use crate::postprocessing::ResponseParser;
use crate::preprocessing::RequestTopic;
use std::sync::Arc;
use tracing::{info, instrument};

pub struct CombinedResponder {
    client: Arc<dyn ModelClient>,
    parser: ResponseParser,
    instructions: String,
}

impl CombinedResponder {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            client,
            parser: ResponseParser::default(),
            instructions: instructions(DEFAULT_EXPLANATION_MARKER, DEFAULT_EXAMPLE_MARKER),
        }
    }

    pub fn with_markers(
        client: Arc<dyn ModelClient>,
        explanation_marker: &str,
        example_marker: &str,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            client,
            parser: ResponseParser::new(explanation_marker, example_marker)?,
            instructions: instructions(explanation_marker, example_marker),
        })
    }

    pub fn build_prompt(&self, topic: &RequestTopic, question: &str) -> String {
        compose_prompt(&self.instructions, topic, question)
    }

    /// A failed call is escalated; unparseable text degrades to fallback sections.
    #[instrument(skip_all, fields(query_len = query.len(), history_len = context.len()))]
    pub async fn execute(
        &self,
        query: &str,
        context: &mut Conversation,
        topic: &RequestTopic,
    ) -> Result<Vec<GeneratedResponse>, EngineError> {
        let question = append_query(query, context)?;
        let prompt = self.build_prompt(topic, &question);

        let raw = self.client.generate(&prompt, prior_turns(context)).await?;
        let parsed = self.parser.parse(&raw);

        info!(raw_len = raw.len(), "Combined response split");
        Ok(vec![
            GeneratedResponse::new(Persona::Explainer, parsed.explanation),
            GeneratedResponse::new(Persona::ExampleProvider, parsed.example),
        ])
    }
}

#[async_trait::async_trait]
impl Responder for CombinedResponder {
    async fn respond(
        &self,
        query: &str,
        context: &mut Conversation,
        topic: &RequestTopic,
    ) -> Result<Vec<GeneratedResponse>, EngineError> {
        self.execute(query, context, topic).await
    }
}

fn instructions(explanation_marker: &str, example_marker: &str) -> String {
    format!(
        "You are a friendly tutor. Answer the student's question in exactly two sections.
Begin the first section with \"{explanation}:\" and give a clear, step-by-step explanation.
Begin the second section with \"{example}:\" and give a concrete, worked example.
Do not add any other headings.",
        explanation = explanation_marker,
        example = example_marker
    )
}
