//! Process-wide configuration, read once at startup and never mutated.

use crate::conversation::DEFAULT_MAX_TURNS;
use crate::llm::{GenerationConfig, RetryPolicy};
use crate::postprocessing::parser::{DEFAULT_EXAMPLE_MARKER, DEFAULT_EXPLANATION_MARKER};
use crate::server::rate_limit::RateLimitConfig;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;
use zeroize::Zeroizing;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variables: {0}")]
    Missing(String),
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment '{}'", other)),
        }
    }
}

/// How a chat message is turned into the two sub-responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStrategy {
    /// One model call per persona.
    Personas,
    /// One model call, split by section markers.
    Combined,
}

impl ResponseStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStrategy::Personas => "personas",
            ResponseStrategy::Combined => "combined",
        }
    }
}

impl FromStr for ResponseStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "personas" => Ok(ResponseStrategy::Personas),
            "combined" => Ok(ResponseStrategy::Combined),
            other => Err(format!("unknown strategy '{}'", other)),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub api_key: Zeroizing<String>,
    pub model: String,
    pub api_url: Url,
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub strategy: ResponseStrategy,
    /// Section markers for the combined strategy.
    pub explanation_marker: String,
    pub example_marker: String,
    pub max_turns: usize,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    pub generation: GenerationConfig,
    pub rate_limit: RateLimitConfig,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GEMINI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing("GEMINI_API_KEY".to_string()))?;

        let api_url_raw = lookup("GEMINI_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(&api_url_raw).map_err(|e| ConfigError::Invalid {
            key: "GEMINI_API_URL",
            reason: e.to_string(),
        })?;

        let max_turns: usize = parse_or(&lookup, "MAX_CONVERSATION_TURNS", DEFAULT_MAX_TURNS)?;
        if max_turns == 0 {
            return Err(ConfigError::Invalid {
                key: "MAX_CONVERSATION_TURNS",
                reason: "must be at least 1".to_string(),
            });
        }

        let explanation_marker = marker(&lookup, "EXPLANATION_MARKER", DEFAULT_EXPLANATION_MARKER);
        let example_marker = marker(&lookup, "EXAMPLE_MARKER", DEFAULT_EXAMPLE_MARKER);
        if explanation_marker == example_marker {
            return Err(ConfigError::Invalid {
                key: "EXAMPLE_MARKER",
                reason: "must differ from EXPLANATION_MARKER".to_string(),
            });
        }

        let max_attempts: u32 = parse_or(&lookup, "MAX_RETRIES", 3)?;
        if max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "MAX_RETRIES",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            api_key: Zeroizing::new(api_key),
            model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_url,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 3000)?,
            environment: parse_or(&lookup, "APP_ENV", Environment::Development)?,
            strategy: parse_or(&lookup, "RESPONSE_STRATEGY", ResponseStrategy::Personas)?,
            explanation_marker,
            example_marker,
            max_turns,
            request_timeout: Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?),
            retry: RetryPolicy {
                max_attempts,
                base_delay: Duration::from_millis(parse_or(&lookup, "RETRY_BASE_DELAY_MS", 1000)?),
            },
            generation: GenerationConfig {
                temperature: parse_or(&lookup, "TEMPERATURE", 0.7)?,
                max_output_tokens: parse_or(&lookup, "MAX_OUTPUT_TOKENS", 1024)?,
            },
            rate_limit: RateLimitConfig {
                max_requests: parse_or(&lookup, "RATE_LIMIT_MAX_REQUESTS", 100)?,
                window: Duration::from_secs(parse_or(&lookup, "RATE_LIMIT_WINDOW_SECS", 900)?),
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("api_url", &self.api_url.as_str())
            .field("host", &self.host)
            .field("port", &self.port)
            .field("environment", &self.environment)
            .field("strategy", &self.strategy)
            .field("explanation_marker", &self.explanation_marker)
            .field("example_marker", &self.example_marker)
            .field("max_turns", &self.max_turns)
            .field("request_timeout", &self.request_timeout)
            .field("retry", &self.retry)
            .field("generation", &self.generation)
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                key,
                reason: e.to_string(),
            })
        }
        _ => Ok(default),
    }
}

/// Blank values fall back to the default marker.
fn marker<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "secret")])).unwrap();
        assert_eq!(config.api_key.as_str(), "secret");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_turns, 100);
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.strategy, ResponseStrategy::Personas);
        assert_eq!(config.explanation_marker, "Explanation");
        assert_eq!(config.example_marker, "Example");
        assert!(!config.is_production());
    }

    #[test]
    fn missing_key_is_reported() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("GEMINI_MODEL", "gemini-pro"),
            ("PORT", "8080"),
            ("APP_ENV", "production"),
            ("RESPONSE_STRATEGY", "combined"),
            ("MAX_RETRIES", "5"),
            ("RETRY_BASE_DELAY_MS", "250"),
            ("EXPLANATION_MARKER", "Why"),
            ("EXAMPLE_MARKER", "  For instance "),
        ]))
        .unwrap();
        assert_eq!(config.model, "gemini-pro");
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert!(config.is_production());
        assert_eq!(config.strategy, ResponseStrategy::Combined);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay, Duration::from_millis(250));
        assert_eq!(config.explanation_marker, "Why");
        assert_eq!(config.example_marker, "For instance");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let bad_port = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("PORT", "not-a-port"),
        ]));
        assert!(matches!(bad_port, Err(ConfigError::Invalid { key: "PORT", .. })));

        let bad_url = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("GEMINI_API_URL", "not a url"),
        ]));
        assert!(matches!(bad_url, Err(ConfigError::Invalid { key: "GEMINI_API_URL", .. })));

        let same_markers = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("EXPLANATION_MARKER", "Part"),
            ("EXAMPLE_MARKER", " Part "),
        ]));
        assert!(matches!(same_markers, Err(ConfigError::Invalid { key: "EXAMPLE_MARKER", .. })));

        let zero_turns = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("MAX_CONVERSATION_TURNS", "0"),
        ]));
        assert!(zero_turns.is_err());
    }

    #[test]
    fn debug_output_redacts_the_key() {
        let config = Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "super-secret")])).unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("[REDACTED]"));
    }
}
