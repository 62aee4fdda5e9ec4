use crate::llm_provider::*;
use crate::ollama_provider::{OllamaConfig, OllamaProvider};
use anyhow::{anyhow, Result};
use ecograph_core::LLMConfig;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "anthropic")]
use crate::anthropic_provider::{AnthropicConfig, AnthropicProvider};

#[cfg(feature = "openai-compatible")]
use crate::openai_compatible_provider::{OpenAICompatibleConfig, OpenAICompatibleProvider};

/// Factory for creating LLM providers based on configuration
pub struct LLMProviderFactory;

impl LLMProviderFactory {
    /// Create an LLM provider from configuration
    pub fn create_from_config(config: &LLMConfig) -> Result<Arc<dyn LLMProvider>> {
        let provider_name = config.provider.to_lowercase();

        match provider_name.as_str() {
            "ollama" => Self::create_ollama_provider(config),
            #[cfg(feature = "openai-compatible")]
            "lmstudio" => Self::create_lmstudio_provider(config),
            #[cfg(feature = "openai-compatible")]
            "openai" => Self::create_openai_provider(config),
            #[cfg(feature = "openai-compatible")]
            "openai-compatible" => Self::create_openai_compatible_provider(config),
            #[cfg(feature = "anthropic")]
            "anthropic" => Self::create_anthropic_provider(config),
            _ => Err(anyhow!(
                "Unsupported LLM provider: {}. Available providers: {}",
                provider_name,
                Self::supported_providers().join(", ")
            )),
        }
    }

    fn create_ollama_provider(config: &LLMConfig) -> Result<Arc<dyn LLMProvider>> {
        let ollama_config = OllamaConfig {
            model_name: config
                .model
                .clone()
                .unwrap_or_else(|| OllamaConfig::default().model_name),
            base_url: config.ollama_url.trim_end_matches('/').to_string(),
            context_window: config.context_window,
            timeout: Duration::from_secs(config.timeout_secs),
            max_retries: config.max_retries,
        };

        Ok(Arc::new(OllamaProvider::new(ollama_config)?))
    }

    /// Create a provider using LM Studio's OpenAI-compatible endpoint
    #[cfg(feature = "openai-compatible")]
    fn create_lmstudio_provider(config: &LLMConfig) -> Result<Arc<dyn LLMProvider>> {
        let mut compat_config = OpenAICompatibleConfig::lm_studio(
            &config.lmstudio_url,
            config
                .model
                .clone()
                .unwrap_or_else(|| "local-model".to_string()),
        );
        compat_config.timeout_secs = config.timeout_secs;
        compat_config.max_retries = config.max_retries;

        Ok(Arc::new(OpenAICompatibleProvider::new(compat_config)?))
    }

    #[cfg(feature = "openai-compatible")]
    fn create_openai_provider(config: &LLMConfig) -> Result<Arc<dyn LLMProvider>> {
        let api_key = config.openai_api_key.clone().ok_or_else(|| {
            anyhow!(
                "OpenAI API key not found. Set 'openai_api_key' in config \
                 or OPENAI_API_KEY environment variable"
            )
        })?;

        let mut compat_config = OpenAICompatibleConfig::openai(
            api_key,
            config
                .model
                .clone()
                .unwrap_or_else(|| OpenAICompatibleConfig::default().model),
        );
        compat_config.timeout_secs = config.timeout_secs;
        compat_config.max_retries = config.max_retries;

        Ok(Arc::new(OpenAICompatibleProvider::new(compat_config)?))
    }

    #[cfg(feature = "openai-compatible")]
    fn create_openai_compatible_provider(config: &LLMConfig) -> Result<Arc<dyn LLMProvider>> {
        let base_url = config.openai_compatible_url.clone().ok_or_else(|| {
            anyhow!("OpenAI-compatible base URL not found. Set 'openai_compatible_url' in config")
        })?;

        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow!("Model name is required for OpenAI-compatible provider"))?;

        let mut compat_config =
            OpenAICompatibleConfig::custom(base_url, model, "openai-compatible".to_string());
        compat_config.timeout_secs = config.timeout_secs;
        compat_config.max_retries = config.max_retries;
        compat_config.api_key = config.openai_api_key.clone();

        Ok(Arc::new(OpenAICompatibleProvider::new(compat_config)?))
    }

    #[cfg(feature = "anthropic")]
    fn create_anthropic_provider(config: &LLMConfig) -> Result<Arc<dyn LLMProvider>> {
        let api_key = config.anthropic_api_key.clone().ok_or_else(|| {
            anyhow!(
                "Anthropic API key not found. Set 'anthropic_api_key' in config \
                 or ANTHROPIC_API_KEY environment variable"
            )
        })?;

        let anthropic_config = AnthropicConfig {
            api_key,
            model: config
                .model
                .clone()
                .unwrap_or_else(|| AnthropicConfig::default().model),
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
            ..Default::default()
        };

        Ok(Arc::new(AnthropicProvider::new(anthropic_config)?))
    }

    /// Get a list of supported providers (based on enabled features)
    pub fn supported_providers() -> Vec<&'static str> {
        let mut providers = vec!["ollama"];

        #[cfg(feature = "openai-compatible")]
        providers.extend(["openai", "openai-compatible", "lmstudio"]);

        #[cfg(feature = "anthropic")]
        providers.push("anthropic");

        providers
    }
}
