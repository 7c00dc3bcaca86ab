//! Pluggable model provider trait.
//!
//! Implementations translate provider-agnostic [`ChatRequest`]/[`ChatResponse`]
//! into provider-specific SDK calls. This keeps the pipeline, orchestrator,
//! and analyzer decoupled from any particular model vendor, and lets the
//! test suite substitute scripted providers.

use async_trait::async_trait;

use crate::error::EngineError;
use crate::message::{ChatRequest, ChatResponse};

/// Trait for model provider backends.
///
/// Implementations handle the transport layer (HTTP, SDK calls) for a
/// specific provider while presenting a uniform interface to the engine.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., `"openai"`).
    fn name(&self) -> &'static str;

    /// Executes a chat completion request.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Configuration`] when credentials are missing
    /// and [`EngineError::Provider`] on API failures.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, EngineError>;

    /// Embeds a single text into a vector.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Configuration`] when credentials are missing
    /// and [`EngineError::Provider`] on API failures or an empty
    /// embedding response.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EngineError>;
}
