// crates/core/src/llm/factory.rs
//! Provider factory: creates an LlmProvider from configuration.

use std::sync::Arc;

use super::config::{LlmConfig, ProviderType};
use super::openai::OpenAiProvider;
use super::provider::LlmProvider;
use super::types::LlmError;

/// Create an LLM provider based on the given configuration.
///
/// Returns `NotAvailable` when the provider is disabled or has no API key.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    if !config.enabled {
        return Err(LlmError::NotAvailable("LLM provider is disabled".into()));
    }
    match config.provider {
        ProviderType::OpenAi => {
            let api_key = config
                .api_key
                .as_deref()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| LlmError::NotAvailable("OPENAI_API_KEY is not set".into()))?;
            let provider = OpenAiProvider::new(
                config.endpoint_or_default(),
                api_key,
                &config.model,
                config.timeout_secs,
            )?;
            Ok(Arc::new(provider))
        }
    }
}
