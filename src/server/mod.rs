//! HTTP server: shared state, routes and lifecycle.

pub mod rate_limit;

use crate::commands;
use crate::config::{Config, ResponseStrategy};
use crate::engine::{CombinedResponder, PersonaOrchestrator, Responder};
use crate::error::ApiError;
use crate::llm::ModelClient;
use anyhow::Result;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use rate_limit::RateLimiter;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers. Read-only apart from the rate limiter.
pub struct AppState {
    pub config: Config,
    pub responder: Arc<dyn Responder>,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Fails only if the configured section markers cannot form a pattern.
    pub fn new(config: Config, client: Arc<dyn ModelClient>) -> Result<Self, regex::Error> {
        let responder: Arc<dyn Responder> = match config.strategy {
            ResponseStrategy::Personas => Arc::new(PersonaOrchestrator::new(client)),
            ResponseStrategy::Combined => Arc::new(CombinedResponder::with_markers(
                client,
                &config.explanation_marker,
                &config.example_marker,
            )?),
        };
        let rate_limiter = RateLimiter::new(config.rate_limit);

        Ok(Self {
            config,
            responder,
            rate_limiter,
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let production = state.config.is_production();

    Router::new()
        .route("/api/chat", post(commands::send_message))
        .route("/api/health", get(commands::health))
        .with_state(state)
        .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send>| {
            panic_response(panic, production)
        }))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn panic_response(panic: Box<dyn Any + Send>, production: bool) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    tracing::error!(detail = %detail, "Request handler panicked");
    ApiError::internal(detail, production).into_response()
}

/// Run the HTTP server until Ctrl-C.
pub async fn run(state: AppState) -> Result<()> {
    let addr = state.config.bind_address();
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
