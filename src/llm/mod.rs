//! # Remote model client
//!
//! Sends a prompt plus prior conversation turns to the generative-language API
//! and returns the generated text.
//!
//! ```text
//! prompt + history → wire.rs (provider shape) → send.rs (HTTP attempt) → retry.rs (policy) → text
//! ```
//!
//! Each `generate` call owns its retry budget. HTTP failures whose status or message marks
//! them as authentication, quota/billing or invalid-request problems are returned immediately;
//! timeouts, transport errors and malformed bodies are retried with linearly increasing delay.

pub mod retry;
pub mod send;
pub mod wire;

pub use retry::{Classify, FailureClass, RetryPolicy};
pub use send::{AttemptError, GeminiClient};
pub use wire::*;

use crate::conversation::Turn;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    #[error("Non-retryable {class} failure: {message}")]
    NonRetryable { class: FailureClass, message: String },

    #[error("All {attempts} attempts failed. Last error: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(String),
}

/// Anything that can turn a prompt and history into generated text.
#[async_trait::async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, prompt: &str, history: &[Turn]) -> Result<String, LlmError>;
}
