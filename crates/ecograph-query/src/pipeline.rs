// ABOUTME: Question pipeline: validate, select template, generate, sanitize, execute, synthesize
// ABOUTME: Every stage failure is folded into a renderable PipelineResult; ask() never errors

use crate::error::{PipelineError, Result};
use crate::executor::QueryExecutor;
use crate::generator::QueryGenerator;
use crate::sanitizer::sanitize;
use crate::synthesizer::AnswerSynthesizer;
use crate::template::TemplateChoice;
use crate::template_selector::TemplateSelector;
use ecograph_ai::{GenerationConfig, LLMProvider};
use ecograph_core::PipelineConfig;
use ecograph_graph::{SchemaDescriptor, StoreHandle};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};

const PIPELINE_LOG_TARGET: &str = "ecograph::query::pipeline";

/// Questions longer than this must mention at least one domain term
const OFF_TOPIC_MIN_CHARS: usize = 50;

/// Case-insensitive substrings that mark a question as on-topic
const DOMAIN_TERMS: &[&str] = &[
    "aurory", "aury", "xaury", "nerite", "ember", "wisdom", "neftie", "aurorian", "dao", "p2e",
    "token", "nft", "game", "economy", "guild", "staking", "yield", "farming", "defi",
    "governance", "proposal", "vote", "trading", "market", "price", "chart", "analysis",
    "strategy", "wallet", "player", "community", "sentiment", "risk", "whale", "holder",
];

/// Reject questions the pipeline should not spend model or database calls on.
///
/// Blank and over-long input is refused, as is longer input that mentions
/// none of the game-economy terms.
pub fn validate_question(question: &str, max_chars: usize) -> Result<()> {
    let trimmed = question.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::InvalidQuestion(
            "Please enter a question about the game economy.".to_string(),
        ));
    }
    let chars = question.chars().count();
    if chars > max_chars {
        return Err(PipelineError::InvalidQuestion(format!(
            "Please keep questions under {} characters.",
            max_chars
        )));
    }
    if chars > OFF_TOPIC_MIN_CHARS {
        let lowered = trimmed.to_lowercase();
        if !DOMAIN_TERMS.iter().any(|term| lowered.contains(term)) {
            return Err(PipelineError::InvalidQuestion(
                "I specialize in game-economy analysis. Please ask about tokens, NFTs, \
                 players, markets or DAO governance."
                    .to_string(),
            ));
        }
    }
    Ok(())
}

/// What the caller renders for one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub answer: String,
    /// Sanitized query, whenever one was produced
    pub query: Option<String>,
    pub error: bool,
    /// `None` when the question was rejected before selection
    pub template: Option<TemplateChoice>,
}

impl PipelineResult {
    pub fn success(answer: String, query: Option<String>, template: Option<TemplateChoice>) -> Self {
        Self {
            answer,
            query,
            error: false,
            template,
        }
    }

    pub fn failure(
        err: &PipelineError,
        query: Option<String>,
        template: Option<TemplateChoice>,
    ) -> Self {
        Self {
            answer: err.user_message(),
            query,
            error: true,
            template,
        }
    }
}

pub struct QueryPipeline {
    selector: TemplateSelector,
    generator: QueryGenerator,
    executor: QueryExecutor,
    synthesizer: AnswerSynthesizer,
    store: StoreHandle,
    schema: SchemaDescriptor,
    max_question_chars: usize,
}

impl QueryPipeline {
    pub fn new(
        llm: Arc<dyn LLMProvider>,
        store: StoreHandle,
        schema: SchemaDescriptor,
        config: &PipelineConfig,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            selector: TemplateSelector::with_threshold(config.template_threshold),
            generator: QueryGenerator::new(llm.clone(), generation.clone()),
            executor: QueryExecutor::new(config.top_k, config.max_result_bytes),
            synthesizer: AnswerSynthesizer::new(llm, generation),
            store,
            schema,
            max_question_chars: config.max_question_chars,
        }
    }

    /// Replace the template selector (custom templates or threshold)
    pub fn with_selector(mut self, selector: TemplateSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn selector(&self) -> &TemplateSelector {
        &self.selector
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    pub fn schema(&self) -> &SchemaDescriptor {
        &self.schema
    }

    pub async fn ask(&self, question: &str) -> PipelineResult {
        if let Err(err) = validate_question(question, self.max_question_chars) {
            debug!(target: PIPELINE_LOG_TARGET, kind = err.kind(), "Question rejected");
            return PipelineResult::failure(&err, None, None);
        }

        let question = question.trim();
        let selection = self.selector.select(question);
        let choice = selection.choice;
        let span = info_span!("ask", template = choice.as_str());

        let mut query = None;
        let outcome = self
            .answer(question, selection.template, &mut query)
            .instrument(span)
            .await;

        match outcome {
            Ok(answer) => {
                info!(target: PIPELINE_LOG_TARGET, template = choice.as_str(), "Question answered");
                PipelineResult::success(answer, query, Some(choice))
            }
            Err(err) => {
                warn!(
                    target: PIPELINE_LOG_TARGET,
                    template = choice.as_str(),
                    kind = err.kind(),
                    error = %err,
                    "Question failed"
                );
                PipelineResult::failure(&err, query, Some(choice))
            }
        }
    }

    async fn answer(
        &self,
        question: &str,
        template: &str,
        query: &mut Option<String>,
    ) -> Result<String> {
        let raw = self
            .generator
            .generate(question, &self.schema, template)
            .await?;

        let sanitized = sanitize(&raw);
        if sanitized.is_empty() {
            return Err(PipelineError::EmptySanitizedQuery);
        }
        debug!(
            target: PIPELINE_LOG_TARGET,
            strategy = %sanitized.strategy,
            "Sanitized query:\n{}",
            sanitized.text
        );
        *query = Some(sanitized.text.clone());

        let result = self.executor.execute(&self.store, &sanitized.text).await?;
        self.synthesizer.synthesize(question, &result).await
    }
}
