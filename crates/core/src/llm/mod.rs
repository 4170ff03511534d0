// crates/core/src/llm/mod.rs
//! LLM integration module for conversation analysis.
//!
//! Provides the `LlmProvider` trait and an OpenAI-compatible HTTP
//! implementation used to score conversation transcripts.

pub mod config;
pub mod factory;
pub mod openai;
pub mod provider;
pub mod types;

pub use config::{LlmConfig, ProviderType};
pub use factory::create_provider;
pub use openai::OpenAiProvider;
pub use provider::LlmProvider;
pub use types::{CompletionRequest, CompletionResponse, LlmError, ResponseFormat};
