// crates/core/src/llm/provider.rs
//! LlmProvider trait defining the interface for LLM integrations.

use async_trait::async_trait;

use super::types::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for LLM providers.
///
/// Implementations include:
/// - `OpenAiProvider`: OpenAI-compatible `/chat/completions` endpoint
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run a completion with system + user prompt.
    /// Used by: conversation analysis.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Check if the provider is available (API key set, endpoint reachable, etc.)
    async fn health_check(&self) -> Result<(), LlmError>;

    /// Provider name for logging/display (e.g. "openai").
    fn name(&self) -> &str;

    /// Model identifier (e.g. "gpt-4o-mini").
    fn model(&self) -> &str;
}
