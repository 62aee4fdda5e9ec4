use crate::error::{PipelineError, Result};
use crate::prompts::{render_template, CYPHER_SYSTEM_PROMPT};
use ecograph_ai::{GenerationConfig, LLMProvider, Message};
use ecograph_graph::SchemaDescriptor;
use std::sync::Arc;
use tracing::{debug, warn};

const GENERATOR_LOG_TARGET: &str = "ecograph::query::generator";

/// Asks the model for a Cypher query. One attempt per question.
pub struct QueryGenerator {
    llm: Arc<dyn LLMProvider>,
    generation: GenerationConfig,
}

impl QueryGenerator {
    pub fn new(llm: Arc<dyn LLMProvider>, generation: GenerationConfig) -> Self {
        Self { llm, generation }
    }

    /// Raw model text, not yet sanitized
    pub async fn generate(
        &self,
        question: &str,
        schema: &SchemaDescriptor,
        template: &str,
    ) -> Result<String> {
        let prompt = render_template(template, &schema.render(), question);
        let messages = [Message::system(CYPHER_SYSTEM_PROMPT), Message::user(prompt)];

        let response = self
            .llm
            .generate_chat(&messages, &self.generation)
            .await
            .map_err(|e| {
                warn!(
                    target: GENERATOR_LOG_TARGET,
                    provider = self.llm.provider_name(),
                    error = %e,
                    "Query generation failed"
                );
                PipelineError::GenerationFailure(format!("{:#}", e))
            })?;

        if response.content.trim().is_empty() {
            return Err(PipelineError::GenerationFailure(
                "the model returned unusable content".to_string(),
            ));
        }

        debug!(
            target: GENERATOR_LOG_TARGET,
            model = %response.model,
            completion_tokens = ?response.completion_tokens,
            "Generated raw query:\n{}",
            response.content
        );
        Ok(response.content)
    }
}
