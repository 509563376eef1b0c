//! Per-client sliding-window request limit.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(900),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Too many requests: at most {limit} per {window_seconds}s, please try again later")]
pub struct RateLimitError {
    pub limit: u32,
    pub window_seconds: u64,
}

/// Sweep every client once the map holds this many.
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    requests: Arc<RwLock<HashMap<String, Vec<Instant>>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            requests: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    #[instrument(skip(self))]
    pub async fn check_rate_limit(&self, client_id: &str) -> Result<(), RateLimitError> {
        let mut requests = self.requests.write().await;
        let now = Instant::now();
        let window = self.config.window;

        if requests.len() >= SWEEP_THRESHOLD {
            requests.retain(|_, times| {
                times.retain(|&t| now.duration_since(t) < window);
                !times.is_empty()
            });
            debug!(clients = requests.len(), "Rate limiter swept");
        }

        let client_requests = requests.entry(client_id.to_string()).or_default();
        client_requests.retain(|&t| now.duration_since(t) < window);

        if client_requests.len() as u32 >= self.config.max_requests {
            warn!(client_id, "Rate limit exceeded");
            return Err(RateLimitError {
                limit: self.config.max_requests,
                window_seconds: window.as_secs(),
            });
        }

        client_requests.push(now);
        Ok(())
    }

    #[cfg(test)]
    async fn tracked_clients(&self) -> usize {
        self.requests.read().await.len()
    }
}
