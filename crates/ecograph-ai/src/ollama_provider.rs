use crate::llm_provider::*;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Configuration for a local Ollama server
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub model_name: String,
    pub base_url: String,
    pub context_window: usize,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            model_name: "llama3.1".to_string(),
            base_url: "http://localhost:11434".to_string(),
            context_window: 32_000,
            timeout: Duration::from_secs(60),
            max_retries: 0,
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<usize>,
    num_ctx: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    model: Option<String>,
    message: OllamaMessage,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    eval_count: Option<usize>,
    #[serde(default)]
    prompt_eval_count: Option<usize>,
}

pub struct OllamaProvider {
    client: Client,
    config: OllamaConfig,
}

impl OllamaProvider {
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    async fn try_request(
        &self,
        messages: &[Message],
        config: &GenerationConfig,
    ) -> Result<OllamaChatResponse> {
        let request = OllamaChatRequest {
            model: self.config.model_name.clone(),
            messages: messages
                .iter()
                .map(|m| OllamaMessage {
                    role: m.role.to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            stream: false,
            options: OllamaOptions {
                temperature: config.temperature,
                num_predict: config.max_tokens,
                num_ctx: self.config.context_window,
                top_p: config.top_p,
                stop: config.stop.clone(),
            },
        };

        debug!(
            model = %self.config.model_name,
            "Sending chat request to Ollama at {}",
            self.config.base_url
        );

        let response = self
            .client
            .post(format!("{}/api/chat", self.config.base_url))
            .json(&request)
            .send()
            .await
            .context(format!(
                "Failed to send request to Ollama at {}",
                self.config.base_url
            ))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("Ollama API error ({}): {}", status, error_text));
        }

        response
            .json::<OllamaChatResponse>()
            .await
            .context("Failed to parse Ollama response")
    }
}

#[async_trait]
impl LLMProvider for OllamaProvider {
    async fn generate_chat(
        &self,
        messages: &[Message],
        config: &GenerationConfig,
    ) -> LLMResult<LLMResponse> {
        let response = send_with_retries("ollama", self.config.max_retries, || {
            self.try_request(messages, config)
        })
        .await?;

        let total_tokens = match (response.prompt_eval_count, response.eval_count) {
            (Some(p), Some(c)) => Some(p + c),
            _ => None,
        };

        Ok(LLMResponse {
            content: response.message.content,
            total_tokens,
            prompt_tokens: response.prompt_eval_count,
            completion_tokens: response.eval_count,
            finish_reason: response.done_reason,
            model: response
                .model
                .unwrap_or_else(|| self.config.model_name.clone()),
        })
    }

    async fn is_available(&self) -> bool {
        let request = self
            .client
            .get(format!("{}/api/tags", self.config.base_url))
            .send();

        match timeout(Duration::from_secs(5), request).await {
            Ok(Ok(resp)) => resp.status().is_success(),
            _ => false,
        }
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_omit_unset_fields() {
        let options = OllamaOptions {
            temperature: 0.0,
            num_predict: None,
            num_ctx: 4096,
            top_p: None,
            stop: None,
        };
        let json = serde_json::to_value(&options).expect("serializes");
        assert_eq!(json["num_ctx"], 4096);
        assert!(json.get("num_predict").is_none());
        assert!(json.get("stop").is_none());
    }

    #[test]
    fn test_response_without_counters() {
        let raw = r#"{"message":{"role":"assistant","content":"hello"},"done":true}"#;
        let parsed: OllamaChatResponse = serde_json::from_str(raw).expect("parses");
        assert_eq!(parsed.message.content, "hello");
        assert!(parsed.eval_count.is_none());
    }
}
