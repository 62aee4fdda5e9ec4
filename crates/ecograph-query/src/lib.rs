// ABOUTME: Question-to-Cypher pipeline for the game-economy knowledge graph
// ABOUTME: Template selection, generation, sanitization, bounded execution, answer synthesis and tool dispatch

pub mod error;
pub mod executor;
pub mod generator;
pub mod pipeline;
pub mod prompts;
pub mod sanitizer;
pub mod synthesizer;
pub mod template;
pub mod template_selector;
pub mod tools;

pub use error::PipelineError;
pub use executor::{ExecutionResult, QueryExecutor};
pub use generator::QueryGenerator;
pub use pipeline::{validate_question, PipelineResult, QueryPipeline};
pub use sanitizer::{sanitize, SanitizeStrategy, SanitizedQuery};
pub use synthesizer::AnswerSynthesizer;
pub use template::TemplateChoice;
pub use template_selector::{TemplateSelection, TemplateSelector};
pub use tools::{AssistantTool, ToolCall, ToolRouter};
