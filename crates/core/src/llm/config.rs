// crates/core/src/llm/config.rs
//! LLM provider configuration types.

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// Configuration for an LLM provider instance.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: ProviderType,
    pub model: String,
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub enabled: bool,
    pub timeout_secs: u64,
}

/// Supported LLM provider types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    OpenAi,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderType::OpenAi,
            model: DEFAULT_MODEL.into(),
            api_key: None,
            endpoint: None,
            enabled: true,
            timeout_secs: 60,
        }
    }
}

impl LlmConfig {
    /// Endpoint base URL without a trailing slash.
    pub fn endpoint_or_default(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or(DEFAULT_ENDPOINT)
            .trim_end_matches('/')
    }

    /// True when a provider can be built from this config.
    pub fn is_usable(&self) -> bool {
        self.enabled && self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = LlmConfig::default();
        assert_eq!(cfg.model, "gpt-4o-mini");
        assert_eq!(cfg.timeout_secs, 60);
        assert_eq!(cfg.endpoint_or_default(), "https://api.openai.com/v1");
        assert!(!cfg.is_usable());
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let cfg = LlmConfig {
            endpoint: Some("http://localhost:1234/v1/".into()),
            ..Default::default()
        };
        assert_eq!(cfg.endpoint_or_default(), "http://localhost:1234/v1");
    }

    #[test]
    fn test_disabled_is_not_usable() {
        let cfg = LlmConfig {
            api_key: Some("sk-test".into()),
            enabled: false,
            ..Default::default()
        };
        assert!(!cfg.is_usable());
    }
}
