use crate::conversation::{Conversation, Role, Turn};
use crate::engine::GeneratedResponse;
use crate::error::ApiError;
use crate::personalities::Persona;
use crate::preprocessing::{RequestTopic, ValidationError};
use crate::server::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

/* ---------- 1.  PAYLOADS ---------- */

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_history: Option<Vec<HistoryEntry>>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub persona: Option<Persona>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AgentMessage {
    pub message: String,
    pub agent_persona: Persona,
    pub timestamp: DateTime<Utc>,
}

impl From<GeneratedResponse> for AgentMessage {
    fn from(response: GeneratedResponse) -> Self {
        Self {
            message: response.text,
            agent_persona: response.persona,
            timestamp: response.produced_at,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ChatResponse {
    pub success: bool,
    pub responses: Vec<AgentMessage>,
}

#[derive(Serialize, Debug)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model: String,
    pub strategy: &'static str,
    pub timestamp: DateTime<Utc>,
}

/* ---------- 2.  HISTORY ---------- */

/// Rebuilds the conversation, leaving room for the new user turn.
pub fn build_conversation(
    history: Vec<HistoryEntry>,
    max_turns: usize,
) -> Result<Conversation, ValidationError> {
    let max_history = max_turns.saturating_sub(1);
    if history.len() > max_history {
        return Err(ValidationError::HistoryTooLong {
            length: history.len(),
            max: max_history,
        });
    }

    let turns = history
        .into_iter()
        .map(|entry| {
            Turn::with_timestamp(
                entry.role,
                entry.content,
                entry.timestamp.unwrap_or_else(Utc::now),
                entry.persona,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Conversation::from_turns(turns, max_turns)?)
}

fn client_id(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("anonymous")
        .to_string()
}

/* ---------- 3.  HANDLERS ---------- */

#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    state.rate_limiter.check_rate_limit(&client_id(&headers)).await?;

    let Json(request) = payload.map_err(|rejection| ApiError::validation(rejection.body_text()))?;

    let topic = RequestTopic::new(request.subject.as_deref(), request.topic.as_deref())
        .map_err(|e| ApiError::validation(e.to_string()))?;
    let mut conversation = build_conversation(
        request.conversation_history.unwrap_or_default(),
        state.config.max_turns,
    )
    .map_err(|e| ApiError::validation(e.to_string()))?;

    let production = state.config.is_production();
    let responses = state
        .responder
        .respond(&request.message, &mut conversation, &topic)
        .await
        .map_err(|e| {
            error!(error = %e, "Chat request failed");
            ApiError::from_engine(e, production)
        })?;

    info!(responses = responses.len(), "Chat request answered");
    Ok(Json(ChatResponse {
        success: true,
        responses: responses.into_iter().map(AgentMessage::from).collect(),
    }))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: state.config.model.clone(),
        strategy: state.config.strategy.as_str(),
        timestamp: Utc::now(),
    })
}
