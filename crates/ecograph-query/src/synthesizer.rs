use crate::error::{PipelineError, Result};
use crate::executor::ExecutionResult;
use crate::prompts::{ANSWER_SYSTEM_PROMPT, NO_DATA_ANSWER};
use ecograph_ai::{GenerationConfig, LLMProvider, Message};
use std::sync::Arc;
use tracing::{debug, warn};

const SYNTHESIZER_LOG_TARGET: &str = "ecograph::query::synthesizer";

/// Turns query rows into a natural-language answer grounded in those rows
pub struct AnswerSynthesizer {
    llm: Arc<dyn LLMProvider>,
    generation: GenerationConfig,
}

impl AnswerSynthesizer {
    pub fn new(llm: Arc<dyn LLMProvider>, generation: GenerationConfig) -> Self {
        Self { llm, generation }
    }

    pub async fn synthesize(&self, question: &str, result: &ExecutionResult) -> Result<String> {
        if result.is_empty() {
            debug!(target: SYNTHESIZER_LOG_TARGET, "No rows; answering without the model");
            return Ok(NO_DATA_ANSWER.to_string());
        }

        let rows = serde_json::to_string_pretty(&result.rows)
            .map_err(|e| PipelineError::SynthesisFailure(e.to_string()))?;
        let mut context = format!("Question:\n{}\n\nRows:\n{}", question, rows);
        if result.truncated() {
            context.push_str(&format!(
                "\n\n(Showing {} of {} rows.)",
                result.rows.len(),
                result.total_rows
            ));
        }

        let messages = [Message::system(ANSWER_SYSTEM_PROMPT), Message::user(context)];
        let response = self
            .llm
            .generate_chat(&messages, &self.generation)
            .await
            .map_err(|e| {
                warn!(
                    target: SYNTHESIZER_LOG_TARGET,
                    provider = self.llm.provider_name(),
                    error = %e,
                    "Answer synthesis failed"
                );
                PipelineError::SynthesisFailure(format!("{:#}", e))
            })?;

        let answer = response.content.trim();
        if answer.is_empty() {
            return Err(PipelineError::SynthesisFailure(
                "the model returned an empty answer".to_string(),
            ));
        }
        Ok(answer.to_string())
    }
}
