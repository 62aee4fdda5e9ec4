use thiserror::Error;

/// Stage failures of the question pipeline. `Display` is the text shown to the user.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("{0}")]
    InvalidQuestion(String),

    #[error("The language model is not configured correctly ({reason}). Please check your provider settings.")]
    ModelUnavailable { reason: String },

    #[error("Failed to generate Cypher query: {0}")]
    GenerationFailure(String),

    #[error("Failed to generate Cypher query: the model did not return a usable query. Please rephrase your question.")]
    EmptySanitizedQuery,

    #[error("Graph database is unavailable ({reason}). Please check your Neo4j connection and try again.")]
    StoreUnavailable { reason: String },

    #[error("Database query failed: {reason}. Please check your Neo4j connection and try again.\nQuery:\n{query}")]
    ExecutionFailure { query: String, reason: String },

    #[error("The query returned data but the answer could not be composed: {0}")]
    SynthesisFailure(String),
}

impl PipelineError {
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// Stable identifier for logs and JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidQuestion(_) => "invalid_question",
            PipelineError::ModelUnavailable { .. } => "model_unavailable",
            PipelineError::GenerationFailure(_) => "generation_failure",
            PipelineError::EmptySanitizedQuery => "empty_sanitized_query",
            PipelineError::StoreUnavailable { .. } => "store_unavailable",
            PipelineError::ExecutionFailure { .. } => "execution_failure",
            PipelineError::SynthesisFailure(_) => "synthesis_failure",
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_distinct() {
        let errors = [
            PipelineError::InvalidQuestion("Please enter a question.".into()),
            PipelineError::ModelUnavailable {
                reason: "missing API key".into(),
            },
            PipelineError::GenerationFailure("timeout".into()),
            PipelineError::EmptySanitizedQuery,
            PipelineError::StoreUnavailable {
                reason: "connection refused".into(),
            },
            PipelineError::ExecutionFailure {
                query: "MATCH (n) RETURN n".into(),
                reason: "syntax".into(),
            },
            PipelineError::SynthesisFailure("empty".into()),
        ];
        let messages: std::collections::HashSet<String> =
            errors.iter().map(|e| e.user_message()).collect();
        assert_eq!(messages.len(), errors.len());
    }

    #[test]
    fn test_execution_failure_names_the_query() {
        let err = PipelineError::ExecutionFailure {
            query: "MATCH (t:Token) RETURN t".into(),
            reason: "Invalid input".into(),
        };
        assert!(err.user_message().contains("MATCH (t:Token) RETURN t"));
        assert_eq!(err.kind(), "execution_failure");
    }

    #[test]
    fn test_store_unavailable_mentions_connection() {
        let err = PipelineError::StoreUnavailable {
            reason: "refused".into(),
        };
        assert!(err.user_message().contains("Neo4j connection"));
    }
}
