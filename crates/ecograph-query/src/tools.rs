// ABOUTME: Closed set of assistant tools and a router that runs them
// ABOUTME: Graph questions go through the query pipeline; general chat goes straight to the model

use crate::pipeline::{validate_question, PipelineResult, QueryPipeline};
use crate::prompts::GENERAL_CHAT_SYSTEM_PROMPT;
use ecograph_ai::{GenerationConfig, LLMProvider, Message};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

const TOOLS_LOG_TARGET: &str = "ecograph::query::tools";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssistantTool {
    GraphQuery,
    GeneralChat,
}

impl AssistantTool {
    pub fn name(&self) -> &'static str {
        match self {
            AssistantTool::GraphQuery => "graph_query",
            AssistantTool::GeneralChat => "general_chat",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AssistantTool::GraphQuery => {
                "Answer questions about the game economy from the knowledge graph: tokenomics, NFT markets, \
                 DAO proposals, player strategies and wallet activity. Use it whenever structured, \
                 up-to-date data is needed."
            }
            AssistantTool::GeneralChat => {
                "General conversation about the game and its ecosystem that needs no database lookup."
            }
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "graph_query" => Some(AssistantTool::GraphQuery),
            "general_chat" => Some(AssistantTool::GeneralChat),
            _ => None,
        }
    }

    pub fn all() -> Vec<Self> {
        vec![AssistantTool::GraphQuery, AssistantTool::GeneralChat]
    }
}

/// A tool invocation with its typed input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", content = "input", rename_all = "snake_case")]
pub enum ToolCall {
    GraphQuery { question: String },
    GeneralChat { message: String },
}

impl ToolCall {
    pub fn tool(&self) -> AssistantTool {
        match self {
            ToolCall::GraphQuery { .. } => AssistantTool::GraphQuery,
            ToolCall::GeneralChat { .. } => AssistantTool::GeneralChat,
        }
    }

    /// The result for input that is refused before any model or store is touched
    pub fn rejection(&self, max_question_chars: usize) -> Option<PipelineResult> {
        match self {
            ToolCall::GraphQuery { question } => validate_question(question, max_question_chars)
                .err()
                .map(|err| PipelineResult::failure(&err, None, None)),
            ToolCall::GeneralChat { message } if message.trim().is_empty() => {
                Some(empty_message())
            }
            ToolCall::GeneralChat { .. } => None,
        }
    }
}

fn empty_message() -> PipelineResult {
    PipelineResult {
        answer: "Please enter a message about the game ecosystem.".to_string(),
        query: None,
        error: true,
        template: None,
    }
}

pub struct ToolRouter {
    pipeline: Arc<QueryPipeline>,
    llm: Arc<dyn LLMProvider>,
    generation: GenerationConfig,
}

impl ToolRouter {
    pub fn new(
        pipeline: Arc<QueryPipeline>,
        llm: Arc<dyn LLMProvider>,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            pipeline,
            llm,
            generation,
        }
    }

    /// Run a tool call. Never fails; errors come back as `error: true` results.
    pub async fn dispatch(&self, call: ToolCall) -> PipelineResult {
        debug!(target: TOOLS_LOG_TARGET, tool = call.tool().name(), "Dispatching tool call");

        match call {
            ToolCall::GraphQuery { question } => self.pipeline.ask(&question).await,
            ToolCall::GeneralChat { message } => self.chat(&message).await,
        }
    }

    async fn chat(&self, message: &str) -> PipelineResult {
        let message = message.trim();
        if message.is_empty() {
            return empty_message();
        }

        let messages = [
            Message::system(GENERAL_CHAT_SYSTEM_PROMPT),
            Message::user(message),
        ];

        match self.llm.generate_chat(&messages, &self.generation).await {
            Ok(response) if !response.content.trim().is_empty() => {
                PipelineResult::success(response.content.trim().to_string(), None, None)
            }
            Ok(_) => PipelineResult {
                answer: "The assistant returned an empty reply. Please try again.".to_string(),
                query: None,
                error: true,
                template: None,
            },
            Err(e) => {
                warn!(target: TOOLS_LOG_TARGET, error = %e, "General chat failed");
                PipelineResult {
                    answer: format!("General chat failed: {:#}", e),
                    query: None,
                    error: true,
                    template: None,
                }
            }
        }
    }
}
