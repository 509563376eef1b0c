//! Public façade for the engine layer.

pub mod combined;
pub mod core;
pub mod orchestrator;
pub mod traits;
pub mod types;

pub use combined::CombinedResponder;
pub use orchestrator::PersonaOrchestrator;
pub use traits::Responder;
pub use types::{EngineError, GeneratedResponse, PersonaFailure};

#[cfg(test)]
mod tests;
