//! Two-persona tutoring backend: every student question is answered by an
//! Explainer and an Example Provider backed by a remote generative model.

pub mod commands;
pub mod config;
pub mod conversation;
pub mod engine;
pub mod error;
pub mod llm;
pub mod logging;
pub mod personalities;
pub mod postprocessing;
pub mod preprocessing;
pub mod server;

use crate::config::Config;
use crate::llm::GeminiClient;
use crate::server::AppState;
use std::sync::Arc;
use tracing::info;

/// Load configuration, build the model client and serve until shutdown.
pub async fn run() -> anyhow::Result<()> {
    logging::init();

    let config = Config::from_env()?;
    info!(
        model = %config.model,
        strategy = config.strategy.as_str(),
        production = config.is_production(),
        "Configuration loaded"
    );

    let client = GeminiClient::new(&config)?;
    let state = AppState::new(config, Arc::new(client))?;

    server::run(state).await
}
