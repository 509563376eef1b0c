use crate::config::Config;
use crate::conversation::{to_remote_format, Turn};
use crate::llm::{
    Classify, Content, FailureClass, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, LlmError, ModelClient, RemoteRole, RetryPolicy,
};
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;
use zeroize::Zeroizing;

/// Why a single attempt failed.
#[derive(Error, Debug)]
pub enum AttemptError {
    #[error("Request timeout - the API took too long to respond")]
    Timeout,
    #[error("Connection error - unable to reach the API")]
    Connect,
    #[error("Network error: {0}")]
    Network(String),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl Classify for AttemptError {
    /// Only a rejected HTTP request can be non-retryable. Transport failures and
    /// unreadable bodies are transient whatever their text says.
    fn failure_class(&self) -> Option<FailureClass> {
        match self {
            AttemptError::Status {
                status: 401 | 403, ..
            } => Some(FailureClass::Authentication),
            AttemptError::Status { message, .. } => FailureClass::classify(message),
            AttemptError::Timeout
            | AttemptError::Connect
            | AttemptError::Network(_)
            | AttemptError::MalformedResponse(_) => None,
        }
    }
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    http: Client,
    endpoint: Url,
    api_key: Zeroizing<String>,
    generation: GenerationConfig,
    retry: RetryPolicy,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| LlmError::ClientBuild(e.to_string()))?;

        Self::with_http_client(http, config)
    }

    /// Uses a caller-supplied `reqwest::Client`, which should carry its own timeout.
    pub fn with_http_client(http: Client, config: &Config) -> Result<Self, LlmError> {
        let endpoint = generate_content_url(&config.api_url, &config.model)?;

        Ok(Self {
            http,
            endpoint,
            api_key: config.api_key.clone(),
            generation: config.generation.clone(),
            retry: config.retry,
        })
    }

    async fn send_once(&self, request: &GenerateContentRequest) -> Result<String, AttemptError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .header("x-goog-api-key", self.api_key.as_str())
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AttemptError::Timeout
                } else if e.is_connect() {
                    AttemptError::Connect
                } else {
                    AttemptError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = match status.as_u16() {
                401 => "Authentication failed - check your API key".to_string(),
                403 => "Permission denied - API key is not authorized".to_string(),
                429 => format!("Rate limit exceeded: {}", error_text),
                500..=599 => format!("Server error ({}): {}", status, error_text),
                _ => format!("HTTP error {}: {}", status, error_text),
            };
            return Err(AttemptError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AttemptError::MalformedResponse(format!("unreadable JSON: {}", e)))?;

        if let Some(text) = body.text() {
            return Ok(text);
        }
        match body.block_reason() {
            Some(reason) => Err(AttemptError::MalformedResponse(format!(
                "prompt blocked: {}",
                reason
            ))),
            None => Err(AttemptError::MalformedResponse(
                "API returned empty content".to_string(),
            )),
        }
    }
}

#[async_trait::async_trait]
impl ModelClient for GeminiClient {
    #[instrument(skip_all, fields(history_len = history.len(), prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str, history: &[Turn]) -> Result<String, LlmError> {
        let mut contents = to_remote_format(history);
        contents.push(Content::text(RemoteRole::User, prompt));

        let request = GenerateContentRequest {
            contents,
            generation_config: self.generation.clone(),
        };

        let text = self
            .retry
            .run(|attempt| {
                debug!(attempt, "Sending generateContent request");
                self.send_once(&request)
            })
            .await?;

        debug!(response_len = text.len(), "Model call succeeded");
        Ok(text)
    }
}

fn generate_content_url(api_url: &Url, model: &str) -> Result<Url, LlmError> {
    let base = api_url.as_str().trim_end_matches('/');
    let raw = format!("{}/models/{}:generateContent", base, model);
    Url::parse(&raw).map_err(|e| LlmError::ClientBuild(format!("invalid endpoint {}: {}", raw, e)))
}
