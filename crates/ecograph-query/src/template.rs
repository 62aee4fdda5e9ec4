// ABOUTME: Question categories used to pick a query-generation template
// ABOUTME: Closed set with stable snake_case ids for logging, CLI output and JSON results

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateChoice {
    General,
    MarketSentiment,
    DaoCommunity,
    TokenSentiment,
    PlayerStrategy,
    EcosystemRisk,
}

impl TemplateChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateChoice::General => "general",
            TemplateChoice::MarketSentiment => "market_sentiment",
            TemplateChoice::DaoCommunity => "dao_community",
            TemplateChoice::TokenSentiment => "token_sentiment",
            TemplateChoice::PlayerStrategy => "player_strategy",
            TemplateChoice::EcosystemRisk => "ecosystem_risk",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "general" => Some(TemplateChoice::General),
            "market_sentiment" => Some(TemplateChoice::MarketSentiment),
            "dao_community" => Some(TemplateChoice::DaoCommunity),
            "token_sentiment" => Some(TemplateChoice::TokenSentiment),
            "player_strategy" => Some(TemplateChoice::PlayerStrategy),
            "ecosystem_risk" => Some(TemplateChoice::EcosystemRisk),
            _ => None,
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            TemplateChoice::General,
            TemplateChoice::MarketSentiment,
            TemplateChoice::DaoCommunity,
            TemplateChoice::TokenSentiment,
            TemplateChoice::PlayerStrategy,
            TemplateChoice::EcosystemRisk,
        ]
    }

    /// Specialised categories in the order the selector tries them
    pub fn priority_order() -> [Self; 5] {
        [
            TemplateChoice::DaoCommunity,
            TemplateChoice::TokenSentiment,
            TemplateChoice::MarketSentiment,
            TemplateChoice::PlayerStrategy,
            TemplateChoice::EcosystemRisk,
        ]
    }
}

impl fmt::Display for TemplateChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_round_trip() {
        for choice in TemplateChoice::all() {
            assert_eq!(TemplateChoice::parse(choice.as_str()), Some(choice));
        }
        assert_eq!(TemplateChoice::parse("nft_buzz"), None);
    }

    #[test]
    fn test_serde_uses_ids() {
        let json = serde_json::to_string(&TemplateChoice::DaoCommunity).expect("serializes");
        assert_eq!(json, "\"dao_community\"");
    }

    #[test]
    fn test_priority_excludes_general() {
        assert!(!TemplateChoice::priority_order().contains(&TemplateChoice::General));
        assert_eq!(TemplateChoice::priority_order()[0], TemplateChoice::DaoCommunity);
    }
}
