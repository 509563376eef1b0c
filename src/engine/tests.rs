use super::*;
use crate::conversation::{Conversation, Role, Turn};
use crate::llm::{FailureClass, LlmError, ModelClient};
use crate::personalities::Persona;
use crate::postprocessing::EXPLANATION_FALLBACK;
use crate::preprocessing::{CleanerError, RequestTopic, ValidationError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
struct Call {
    prompt: String,
    history: Vec<String>,
}

/// Answers by persona, recognised from the prompt's instruction prefix.
struct ScriptedClient {
    explainer: Result<String, LlmError>,
    example: Result<String, LlmError>,
    explainer_delay: Duration,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedClient {
    fn new(explainer: Result<&str, LlmError>, example: Result<&str, LlmError>) -> Self {
        Self {
            explainer: explainer.map(str::to_string),
            example: example.map(str::to_string),
            explainer_delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ModelClient for ScriptedClient {
    async fn generate(&self, prompt: &str, history: &[Turn]) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(Call {
            prompt: prompt.to_string(),
            history: history.iter().map(|t| t.content().to_string()).collect(),
        });

        if prompt.starts_with("You are the Explainer") {
            tokio::time::sleep(self.explainer_delay).await;
            self.explainer.clone()
        } else if prompt.starts_with("You are the Example Provider") {
            self.example.clone()
        } else {
            // Combined prompt
            self.explainer.clone()
        }
    }
}

fn exhausted(message: &str) -> LlmError {
    LlmError::RetriesExhausted {
        attempts: 3,
        last_error: message.to_string(),
    }
}

#[tokio::test]
async fn responses_follow_persona_order_even_when_explainer_is_slower() {
    let mut client = ScriptedClient::new(Ok("why it works"), Ok("try this"));
    client.explainer_delay = Duration::from_millis(50);
    let orchestrator = PersonaOrchestrator::new(Arc::new(client));
    let mut context = Conversation::default();

    let responses = orchestrator
        .execute("What is a monad?", &mut context, &RequestTopic::default())
        .await
        .unwrap();

    let personas: Vec<Persona> = responses.iter().map(|r| r.persona).collect();
    assert_eq!(personas, vec![Persona::Explainer, Persona::ExampleProvider]);
    assert_eq!(responses[0].text, "why it works");
    assert_eq!(responses[1].text, "try this");
}

#[tokio::test]
async fn query_is_appended_and_excluded_from_history() {
    let client = Arc::new(ScriptedClient::new(Ok("a"), Ok("b")));
    let orchestrator = PersonaOrchestrator::new(client.clone());

    let mut context = Conversation::default();
    context.append(Turn::user("earlier question").unwrap()).unwrap();
    context
        .append(Turn::from_persona(Persona::Explainer, "earlier answer").unwrap())
        .unwrap();

    orchestrator
        .execute("  new question  ", &mut context, &RequestTopic::default())
        .await
        .unwrap();

    assert_eq!(context.len(), 3);
    let latest = context.latest_user_turn().unwrap();
    assert_eq!(latest.content(), "new question");
    assert_eq!(latest.role(), Role::User);

    let calls = client.calls();
    assert_eq!(calls.len(), 2);
    for call in &calls {
        assert_eq!(call.history, vec!["earlier question", "earlier answer"]);
        assert!(call.prompt.ends_with("Student question: new question"));
    }
}

#[tokio::test]
async fn explainer_failure_keeps_example_response() {
    let client = ScriptedClient::new(Err(exhausted("Server error (503)")), Ok("worked example"));
    let orchestrator = PersonaOrchestrator::new(Arc::new(client));
    let mut context = Conversation::default();

    let responses = orchestrator
        .execute("Explain limits", &mut context, &RequestTopic::default())
        .await
        .unwrap();

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].persona, Persona::ExampleProvider);
    assert_eq!(responses[0].text, "worked example");
}

#[tokio::test]
async fn both_failures_escalate() {
    let quota = LlmError::NonRetryable {
        class: FailureClass::Quota,
        message: "quota exceeded".into(),
    };
    let client = ScriptedClient::new(Err(quota.clone()), Err(exhausted("timeout")));
    let orchestrator = PersonaOrchestrator::new(Arc::new(client));
    let mut context = Conversation::default();

    let err = orchestrator
        .execute("Explain limits", &mut context, &RequestTopic::default())
        .await
        .unwrap_err();

    match err {
        EngineError::AllPersonasFailed { failures } => {
            assert_eq!(failures.len(), 2);
            assert_eq!(failures[0].persona, Persona::Explainer);
            assert_eq!(failures[0].error, quota);
            assert_eq!(failures[1].persona, Persona::ExampleProvider);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn invalid_query_fails_before_any_call() {
    let client = Arc::new(ScriptedClient::new(Ok("a"), Ok("b")));
    let orchestrator = PersonaOrchestrator::new(client.clone());
    let mut context = Conversation::default();

    let too_long = "q".repeat(5001);
    for query in ["", "   ", too_long.as_str()] {
        let err = orchestrator
            .execute(query, &mut context, &RequestTopic::default())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(ValidationError::Message(_))));
    }

    assert!(context.is_empty());
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn query_at_length_limit_is_accepted() {
    let orchestrator = PersonaOrchestrator::new(Arc::new(ScriptedClient::new(Ok("a"), Ok("b"))));
    let mut context = Conversation::default();
    let query = "q".repeat(5000);

    let result = orchestrator
        .execute(&query, &mut context, &RequestTopic::default())
        .await;
    tokio_test::assert_ok!(result);
}

#[tokio::test]
async fn full_conversation_rejects_new_query() {
    let client = Arc::new(ScriptedClient::new(Ok("a"), Ok("b")));
    let orchestrator = PersonaOrchestrator::new(client.clone());
    let mut context = Conversation::new(1);
    context.append(Turn::user("only slot").unwrap()).unwrap();

    let err = orchestrator
        .execute("one more", &mut context, &RequestTopic::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::Conversation(_))
    ));
    assert_eq!(context.len(), 1);
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn subject_and_topic_reach_the_prompt() {
    let client = Arc::new(ScriptedClient::new(Ok("a"), Ok("b")));
    let orchestrator = PersonaOrchestrator::new(client.clone());
    let mut context = Conversation::default();
    let topic = RequestTopic::new(Some("Chemistry"), Some("Moles")).unwrap();

    orchestrator
        .execute("What is Avogadro's number?", &mut context, &topic)
        .await
        .unwrap();

    let calls = client.calls();
    assert!(calls[0].prompt.contains("Subject: Chemistry\nTopic: Moles\n"));
}

#[test]
fn persona_prompts_differ_only_in_prefix() {
    let topic = RequestTopic::default();
    let explainer = PersonaOrchestrator::build_prompt(Persona::Explainer, &topic, "Why?");
    let example = PersonaOrchestrator::build_prompt(Persona::ExampleProvider, &topic, "Why?");

    assert!(explainer.starts_with(Persona::Explainer.instructions()));
    assert!(example.starts_with(Persona::ExampleProvider.instructions()));
    assert!(explainer.ends_with("Student question: Why?"));
    assert!(example.ends_with("Student question: Why?"));
}

#[tokio::test]
async fn combined_path_splits_one_answer() {
    let client = Arc::new(ScriptedClient::new(
        Ok("Explanation: Heat flows downhill.\nExample: Ice melts in your hand."),
        Ok("unused"),
    ));
    let responder = CombinedResponder::new(client.clone());
    let mut context = Conversation::default();

    let responses = responder
        .execute("Why does ice melt?", &mut context, &RequestTopic::default())
        .await
        .unwrap();

    assert_eq!(client.calls().len(), 1);
    assert!(client.calls()[0].prompt.contains("\"Explanation:\""));
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].persona, Persona::Explainer);
    assert_eq!(responses[0].text, "Heat flows downhill.");
    assert_eq!(responses[1].persona, Persona::ExampleProvider);
    assert_eq!(responses[1].text, "Ice melts in your hand.");
}

#[tokio::test]
async fn combined_path_degrades_unstructured_text() {
    let client = Arc::new(ScriptedClient::new(Ok("Example: just this"), Ok("unused")));
    let responder = CombinedResponder::new(client);
    let mut context = Conversation::default();

    let responses = responder
        .execute("Why?", &mut context, &RequestTopic::default())
        .await
        .unwrap();

    assert_eq!(responses[0].text, EXPLANATION_FALLBACK);
    assert_eq!(responses[1].text, "just this");
}

#[tokio::test]
async fn combined_path_escalates_remote_failure() {
    let client = Arc::new(ScriptedClient::new(Err(exhausted("down")), Ok("unused")));
    let responder: Arc<dyn Responder> = Arc::new(CombinedResponder::new(client));
    let mut context = Conversation::default();

    let err = responder
        .respond("Why?", &mut context, &RequestTopic::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Remote(LlmError::RetriesExhausted { .. })));
}

#[test]
fn cleaner_error_is_reported_as_validation() {
    let mut context = Conversation::default();
    let err = crate::engine::core::append_query("", &mut context).unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation(ValidationError::Message(CleanerError::EmptyInput))
    );
}
