// ABOUTME: Prompt texts for Cypher generation, answer synthesis and general chat
// ABOUTME: Generation templates carry {schema} and {question} placeholders

/// Rules every generation template shares. A macro so `concat!` can splice it.
macro_rules! cypher_guidelines {
    () => {
        r#"Guidelines:
- Output only the Cypher query. No explanations, no quotation marks.
- Return only relevant properties, never entire nodes or embedding data.
- Use case-insensitive matching when filtering by token names, symbols or proposal titles (toLower(x) CONTAINS toLower('...')).
- Use sensible LIMITs (default to 20) for query performance.
- Use OPTIONAL MATCH to safely handle missing relationships or properties.
- Alias relationships if referencing their properties (e.g. [r:HOLDS] if using r.amount).
- Interpret "move", "transfer" or "send" through the PERFORMED relationship between Wallet and Transaction.
- Treat "player" or "user" actions as Wallet nodes.
- Use IS NOT NULL instead of EXISTS to check for property existence.
- For "social media", "tweets" or "news" filter Document nodes by docType 'tweet' or 'news'.
- For "proposals", "governance" or "DAO discussions" filter by docType = 'dao_proposal'.
- For events filter Document nodes by docType = 'news'.
"#
    };
}

/// Shared tail: schema and question slots
macro_rules! schema_and_question {
    () => {
        r#"
Schema:
{schema}

Question:
{question}
"#
    };
}

mod answer_prompts;
mod dao_community_prompts;
mod ecosystem_risk_prompts;
mod general_prompts;
mod market_sentiment_prompts;
mod player_strategy_prompts;
mod token_sentiment_prompts;

pub use answer_prompts::{ANSWER_SYSTEM_PROMPT, GENERAL_CHAT_SYSTEM_PROMPT, NO_DATA_ANSWER};
pub use dao_community_prompts::DAO_COMMUNITY_TEMPLATE;
pub use ecosystem_risk_prompts::ECOSYSTEM_RISK_TEMPLATE;
pub use general_prompts::{CYPHER_SYSTEM_PROMPT, GENERAL_TEMPLATE};
pub use market_sentiment_prompts::MARKET_SENTIMENT_TEMPLATE;
pub use player_strategy_prompts::PLAYER_STRATEGY_TEMPLATE;
pub use token_sentiment_prompts::TOKEN_SENTIMENT_TEMPLATE;

/// Substitute `{schema}` and `{question}` in a generation template
pub fn render_template(template: &str, schema: &str, question: &str) -> String {
    template
        .replace("{schema}", schema)
        .replace("{question}", question)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_template_has_both_slots() {
        for template in [
            GENERAL_TEMPLATE,
            MARKET_SENTIMENT_TEMPLATE,
            DAO_COMMUNITY_TEMPLATE,
            TOKEN_SENTIMENT_TEMPLATE,
            PLAYER_STRATEGY_TEMPLATE,
            ECOSYSTEM_RISK_TEMPLATE,
        ] {
            assert!(template.contains("{schema}"));
            assert!(template.contains("{question}"));
            assert!(template.contains("Use IS NOT NULL instead of EXISTS"));
        }
    }

    #[test]
    fn test_render_fills_slots() {
        let rendered = render_template(GENERAL_TEMPLATE, "Nodes: Token", "Top tokens?");
        assert!(rendered.contains("Nodes: Token"));
        assert!(rendered.contains("Top tokens?"));
        assert!(!rendered.contains("{schema}"));
        assert!(!rendered.contains("{question}"));
    }
}
