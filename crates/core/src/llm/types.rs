// crates/core/src/llm/types.rs
//! Request/response/error types for LLM integration.

use thiserror::Error;

/// Request for a general-purpose LLM completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system_prompt: Option<String>,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub response_format: ResponseFormat,
}

impl CompletionRequest {
    pub fn new(user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: None,
            user_prompt: user_prompt.into(),
            max_tokens: 1024,
            temperature: 0.0,
            response_format: ResponseFormat::Text,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn json(mut self) -> Self {
        self.response_format = ResponseFormat::Json;
        self
    }
}

/// Desired response format for a completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    Json,
}

/// Response from a general-purpose LLM completion.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub model: Option<String>,
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
    pub latency_ms: u64,
}

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Provider not available: {0}")]
    NotAvailable(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Failed to parse response: {0}")]
    ParseFailed(String),

    #[error("Rate limited, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_request_builder() {
        let req = CompletionRequest::new("hello").with_system_prompt("be brief").json();
        assert_eq!(req.system_prompt.as_deref(), Some("be brief"));
        assert_eq!(req.user_prompt, "hello");
        assert_eq!(req.max_tokens, 1024);
        assert_eq!(CompletionRequest::new("hi").with_max_tokens(256).max_tokens, 256);
        assert_eq!(req.response_format, ResponseFormat::Json);
    }

    #[test]
    fn test_completion_response_has_model_field() {
        let resp = CompletionResponse {
            content: "hello".to_string(),
            model: Some("gpt-4o-mini".to_string()),
            input_tokens: Some(10),
            output_tokens: Some(321),
            latency_ms: 100,
        };
        assert_eq!(resp.model.as_deref(), Some("gpt-4o-mini"));
    }

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::Timeout(30);
        assert_eq!(err.to_string(), "Timeout after 30 seconds");

        let err = LlmError::Http {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 502: bad gateway");

        let err = LlmError::RateLimited { retry_after_secs: 60 };
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
