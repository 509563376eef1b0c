//! Linear-backoff retry around a single model call.

use crate::llm::LlmError;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

/// Failures that retrying cannot fix.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    Authentication,
    Quota,
    InvalidRequest,
}

impl FailureClass {
    const AUTHENTICATION_MARKERS: [&'static str; 5] =
        ["api key", "api_key", "authentication", "unauthorized", "permission"];
    const QUOTA_MARKERS: [&'static str; 2] = ["quota", "billing"];
    const INVALID_MARKERS: [&'static str; 1] = ["invalid"];

    /// Inspects an error message for markers of a non-retryable failure.
    pub fn classify(message: &str) -> Option<Self> {
        let lower = message.to_lowercase();
        let contains_any = |markers: &[&str]| markers.iter().any(|m| lower.contains(m));

        if contains_any(&Self::AUTHENTICATION_MARKERS) {
            Some(FailureClass::Authentication)
        } else if contains_any(&Self::QUOTA_MARKERS) {
            Some(FailureClass::Quota)
        } else if contains_any(&Self::INVALID_MARKERS) {
            Some(FailureClass::InvalidRequest)
        } else {
            None
        }
    }
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureClass::Authentication => "authentication",
            FailureClass::Quota => "quota",
            FailureClass::InvalidRequest => "invalid request",
        };
        f.write_str(label)
    }
}

/// An attempt failure that can say whether retrying could help.
///
/// The default inspects the message text; richer error types override it.
pub trait Classify: fmt::Display {
    fn failure_class(&self) -> Option<FailureClass> {
        FailureClass::classify(&self.to_string())
    }
}

impl Classify for String {}
impl Classify for &str {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

/// Attempt bookkeeping for one call; dropped when the call returns.
struct RetryState {
    attempt: u32,
    last_error: Option<String>,
}

impl RetryPolicy {
    /// Delay slept after failed attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// Runs `call` until it succeeds, fails non-retryably, or the attempt budget runs out.
    pub async fn run<F, Fut, E>(&self, mut call: F) -> Result<String, LlmError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<String, E>>,
        E: Classify,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut state = RetryState {
            attempt: 0,
            last_error: None,
        };

        while state.attempt < max_attempts {
            state.attempt += 1;

            match call(state.attempt).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    let message = e.to_string();

                    if let Some(class) = e.failure_class() {
                        error!(
                            attempt = state.attempt,
                            class = %class,
                            error = %message,
                            "Model call failed with a non-retryable error"
                        );
                        return Err(LlmError::NonRetryable { class, message });
                    }

                    warn!(
                        attempt = state.attempt,
                        max_attempts,
                        error = %message,
                        "Model call attempt failed"
                    );
                    state.last_error = Some(message);

                    if state.attempt < max_attempts {
                        tokio::time::sleep(self.delay_for(state.attempt)).await;
                    }
                }
            }
        }

        Err(LlmError::RetriesExhausted {
            attempts: state.attempt,
            last_error: state.last_error.unwrap_or_default(),
        })
    }
}
