// ABOUTME: LLM provider abstraction used by the query pipeline
// ABOUTME: Ships Ollama plus feature-gated OpenAI-compatible and Anthropic HTTP providers

pub mod llm_factory;
pub mod llm_provider;
pub mod ollama_provider;

// Cloud LLM providers
#[cfg(feature = "anthropic")]
pub mod anthropic_provider;
#[cfg(feature = "openai-compatible")]
pub mod openai_compatible_provider;

pub use llm_factory::LLMProviderFactory;
pub use llm_provider::*;
pub use ollama_provider::{OllamaConfig, OllamaProvider};
