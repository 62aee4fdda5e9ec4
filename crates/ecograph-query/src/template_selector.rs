// ABOUTME: Keyword rule table that maps a question to a generation template
// ABOUTME: Deterministic: categories are tried in fixed priority order, first match wins

use crate::prompts::{
    DAO_COMMUNITY_TEMPLATE, ECOSYSTEM_RISK_TEMPLATE, GENERAL_TEMPLATE, MARKET_SENTIMENT_TEMPLATE,
    PLAYER_STRATEGY_TEMPLATE, TOKEN_SENTIMENT_TEMPLATE,
};
use crate::template::TemplateChoice;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

pub const DEFAULT_TEMPLATE_THRESHOLD: f32 = 0.6;

/// Keyword sets per category. Keywords match at the start of a word, so
/// stems such as "propos" cover "proposal" and "proposals" while "earn"
/// does not fire on "learn".
fn default_patterns(choice: TemplateChoice) -> &'static [&'static [&'static str]] {
    match choice {
        TemplateChoice::DaoCommunity => &[
            &["dao", "propos"],
            &["governance", "vote"],
            &["propos", "community"],
            &["council", "election"],
            &["dao", "community", "respon"],
        ],
        TemplateChoice::TokenSentiment => &[
            &["sentiment", "token"],
            &["aury", "sentiment"],
            &["token", "twitter", "price"],
            &["xaury", "sentiment"],
        ],
        TemplateChoice::MarketSentiment => &[
            &["market", "sentiment"],
            &["nft", "market"],
            &["floor", "price"],
            &["trading", "volume"],
            &["neftie", "price"],
        ],
        TemplateChoice::PlayerStrategy => &[
            &["player", "strateg"],
            &["earning", "strateg"],
            &["earn", "player"],
            &["farming", "yield"],
            &["staking", "reward"],
        ],
        TemplateChoice::EcosystemRisk => &[
            &["risk", "ecosystem"],
            &["economic", "risk"],
            &["inflation", "risk"],
            &["threat", "econom"],
        ],
        TemplateChoice::General => &[],
    }
}

fn default_template(choice: TemplateChoice) -> &'static str {
    match choice {
        TemplateChoice::General => GENERAL_TEMPLATE,
        TemplateChoice::MarketSentiment => MARKET_SENTIMENT_TEMPLATE,
        TemplateChoice::DaoCommunity => DAO_COMMUNITY_TEMPLATE,
        TemplateChoice::TokenSentiment => TOKEN_SENTIMENT_TEMPLATE,
        TemplateChoice::PlayerStrategy => PLAYER_STRATEGY_TEMPLATE,
        TemplateChoice::EcosystemRisk => ECOSYSTEM_RISK_TEMPLATE,
    }
}

/// Outcome of classifying one question
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSelection<'a> {
    pub choice: TemplateChoice,
    /// Generation template with `{schema}` and `{question}` slots
    pub template: &'a str,
    /// Fraction of the winning pattern's keywords present (0.0 for `General`)
    pub score: f32,
}

pub struct TemplateSelector {
    templates: HashMap<TemplateChoice, String>,
    threshold: f32,
}

impl Default for TemplateSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateSelector {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_TEMPLATE_THRESHOLD)
    }

    pub fn with_threshold(threshold: f32) -> Self {
        let templates = TemplateChoice::all()
            .into_iter()
            .map(|choice| (choice, default_template(choice).to_string()))
            .collect();

        Self {
            templates,
            threshold,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Replace the generation template used for `choice`
    pub fn register_template(&mut self, choice: TemplateChoice, template: String) {
        self.templates.insert(choice, template);
    }

    pub fn template(&self, choice: TemplateChoice) -> &str {
        self.templates
            .get(&choice)
            .map(String::as_str)
            .unwrap_or_else(|| default_template(choice))
    }

    pub fn select(&self, question: &str) -> TemplateSelection<'_> {
        let (choice, score) = self.classify(question);
        debug!(
            choice = choice.as_str(),
            score,
            threshold = self.threshold,
            "Selected generation template"
        );

        TemplateSelection {
            choice,
            template: self.template(choice),
            score,
        }
    }

    /// Category and score without the template text
    pub fn classify(&self, question: &str) -> (TemplateChoice, f32) {
        let lowered = question.to_lowercase();

        for choice in TemplateChoice::priority_order() {
            let best = default_patterns(choice)
                .iter()
                .map(|pattern| pattern_score(&lowered, pattern))
                .fold(0.0_f32, f32::max);

            if best > 0.0 && best >= self.threshold {
                return (choice, best);
            }
        }

        (TemplateChoice::General, 0.0)
    }
}

/// Word-start matcher for every keyword in the rule table
static KEYWORD_MATCHERS: Lazy<HashMap<&'static str, Regex>> = Lazy::new(|| {
    TemplateChoice::priority_order()
        .into_iter()
        .flat_map(|choice| default_patterns(choice).iter().flat_map(|p| p.iter().copied()))
        .map(|kw| {
            let re = Regex::new(&format!(r"\b{}", regex::escape(kw)))
                .expect("valid keyword regex");
            (kw, re)
        })
        .collect()
});

fn pattern_score(lowered: &str, pattern: &[&str]) -> f32 {
    if pattern.is_empty() {
        return 0.0;
    }
    let matched = pattern
        .iter()
        .filter(|kw| {
            KEYWORD_MATCHERS
                .get(*kw)
                .is_some_and(|re| re.is_match(lowered))
        })
        .count();
    matched as f32 / pattern.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [(TemplateChoice, &str); 5] = [
        (TemplateChoice::DaoCommunity, "dao proposal"),
        (TemplateChoice::TokenSentiment, "token sentiment"),
        (TemplateChoice::MarketSentiment, "nft market"),
        (TemplateChoice::PlayerStrategy, "player strategy"),
        (TemplateChoice::EcosystemRisk, "ecosystem risk"),
    ];

    fn rank(choice: TemplateChoice) -> usize {
        TemplateChoice::priority_order()
            .iter()
            .position(|c| *c == choice)
            .unwrap_or(usize::MAX)
    }

    #[test]
    fn test_each_sample_selects_its_category() {
        let selector = TemplateSelector::new();
        for (choice, sample) in SAMPLES {
            assert_eq!(selector.select(sample).choice, choice, "sample {:?}", sample);
        }
    }

    #[test]
    fn test_every_ordered_pair_resolves_by_priority() {
        let selector = TemplateSelector::new();
        for (a, sample_a) in SAMPLES {
            for (b, sample_b) in SAMPLES {
                if a == b {
                    continue;
                }
                let question = format!("What about {} and {}?", sample_a, sample_b);
                let expected = if rank(a) < rank(b) { a } else { b };
                assert_eq!(
                    selector.select(&question).choice,
                    expected,
                    "question {:?}",
                    question
                );
            }
        }
    }

    #[test]
    fn test_dao_scenario_question() {
        let selector = TemplateSelector::new();
        let selection = selector.select(
            "What are the active DAO proposals and how is the community responding on social media?",
        );
        assert_eq!(selection.choice, TemplateChoice::DaoCommunity);
        assert_eq!(selection.template, DAO_COMMUNITY_TEMPLATE);
        assert!((selection.score - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_unmatched_question_is_general() {
        let selector = TemplateSelector::new();
        let selection = selector.select("How many wallets exist?");
        assert_eq!(selection.choice, TemplateChoice::General);
        assert_eq!(selection.score, 0.0);
        assert_eq!(selection.template, GENERAL_TEMPLATE);
    }

    #[test]
    fn test_keywords_match_at_word_start() {
        let selector = TemplateSelector::new();
        assert_eq!(
            selector.classify("How do new players learn the game?").0,
            TemplateChoice::General
        );
        assert_eq!(
            selector.classify("What earning strategies do players use?").0,
            TemplateChoice::PlayerStrategy
        );
        // "brisk" is not "risk"
        assert_eq!(
            selector.classify("Is the ecosystem brisk today?").0,
            TemplateChoice::General
        );
    }

    #[test]
    fn test_case_insensitive_and_deterministic() {
        let selector = TemplateSelector::new();
        let first = selector.select("NFT MARKET floor?");
        for _ in 0..10 {
            assert_eq!(selector.select("NFT MARKET floor?"), first);
        }
        assert_eq!(first.choice, TemplateChoice::MarketSentiment);
    }

    #[test]
    fn test_partial_pattern_respects_threshold() {
        // two of three keywords: 0.67
        let question = "how is the community responding?";
        assert_eq!(
            TemplateSelector::with_threshold(0.6).classify(question).0,
            TemplateChoice::DaoCommunity
        );
        assert_eq!(
            TemplateSelector::with_threshold(1.0).classify(question).0,
            TemplateChoice::General
        );
    }

    #[test]
    fn test_register_template_overrides_text() {
        let mut selector = TemplateSelector::new();
        selector.register_template(
            TemplateChoice::EcosystemRisk,
            "custom {schema} {question}".to_string(),
        );
        assert_eq!(
            selector.select("ecosystem risk").template,
            "custom {schema} {question}"
        );
    }
}
