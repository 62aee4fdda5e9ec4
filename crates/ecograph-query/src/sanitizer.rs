// ABOUTME: Cleans raw model output down to the Cypher it contains
// ABOUTME: Line filter first, then a keyword-anchored regex block, then the trimmed text verbatim

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lines that open or continue a query
static CLAUSE_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:OPTIONAL\s+MATCH|ORDER\s+BY|DETACH\s+DELETE|MATCH|WITH|WHERE|RETURN|LIMIT|SKIP|UNWIND|CALL|YIELD|UNION|CASE|WHEN|ELSE|END|AND|OR|CREATE|MERGE|SET|DELETE|DETACH|REMOVE|FOREACH)\b",
    )
    .expect("valid clause keyword regex")
});

/// Prose openers the model puts around a query
static PROSE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:the|according\s+to|based\s+on|here\s+is|this\s+query)\b")
        .expect("valid prose prefix regex")
});

static COMMENTARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)correct|schema").expect("valid commentary regex")
});

static LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:cypher\s+query|query|cypher)\s*:")
        .expect("valid label regex")
});

/// Uppercase query start up to a blank line or the end of the text
static QUERY_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)\b(?:OPTIONAL\s+MATCH|MATCH|UNWIND|CALL|WITH|RETURN|CREATE|MERGE)\b.*?(?:\n[ \t]*\n|\z)",
    )
    .expect("valid query block regex")
});

/// Which cleaning step produced the query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SanitizeStrategy {
    LineFilter,
    RegexFallback,
    Verbatim,
}

impl fmt::Display for SanitizeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SanitizeStrategy::LineFilter => "line_filter",
            SanitizeStrategy::RegexFallback => "regex_fallback",
            SanitizeStrategy::Verbatim => "verbatim",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizedQuery {
    pub text: String,
    pub strategy: SanitizeStrategy,
}

impl SanitizedQuery {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Extract the query from raw model output. Idempotent on its own output.
pub fn sanitize(raw: &str) -> SanitizedQuery {
    let filtered = line_filter(raw);
    if !filtered.is_empty() {
        return SanitizedQuery {
            text: filtered,
            strategy: SanitizeStrategy::LineFilter,
        };
    }

    if let Some(block) = QUERY_BLOCK.find(raw) {
        let block = block.as_str().trim();
        let refiltered = line_filter(block);
        return SanitizedQuery {
            text: if refiltered.is_empty() {
                block.to_string()
            } else {
                refiltered
            },
            strategy: SanitizeStrategy::RegexFallback,
        };
    }

    SanitizedQuery {
        text: raw.trim().to_string(),
        strategy: SanitizeStrategy::Verbatim,
    }
}

fn line_filter(raw: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut in_query = false;

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("```") {
            in_query = false;
            continue;
        }

        let line = normalize(line);
        if line.is_empty() {
            continue;
        }

        // Clause lines win over commentary: `WHERE ... CONTAINS 'correction'` is query text
        if CLAUSE_KEYWORD.is_match(line) {
            kept.push(line);
            in_query = true;
        } else if is_commentary(line) {
            in_query = false;
        } else if in_query {
            kept.push(line);
        }
    }

    kept.join("\n")
}

/// Strip "Query:" style labels and wrapping backticks until nothing changes
fn normalize(mut line: &str) -> &str {
    loop {
        let before = line;
        if let Some(label) = LABEL.find(line) {
            line = line[label.end()..].trim();
        }
        line = line.trim_matches('`').trim();
        if line == before {
            return line;
        }
    }
}

fn is_commentary(line: &str) -> bool {
    PROSE_PREFIX.is_match(line) || COMMENTARY.is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_idempotent(raw: &str) {
        let once = sanitize(raw);
        let twice = sanitize(&once.text);
        assert_eq!(once.text, twice.text, "not idempotent for {:?}", raw);
    }

    #[test]
    fn test_prose_line_is_dropped() {
        let out = sanitize("Here is the answer:\nMATCH (t:Token) RETURN t.name LIMIT 5");
        assert_eq!(out.text, "MATCH (t:Token) RETURN t.name LIMIT 5");
        assert_eq!(out.strategy, SanitizeStrategy::LineFilter);
    }

    #[test]
    fn test_fenced_block_keeps_inner_query() {
        let raw = "```cypher\nMATCH (d:Document)-[:DESCRIBES]->(p:Proposal)\nWHERE d.docType = 'dao_proposal'\nRETURN p.title, p.status\nLIMIT 20\n```\nThis query returns active proposals.";
        assert_eq!(
            sanitize(raw).text,
            "MATCH (d:Document)-[:DESCRIBES]->(p:Proposal)\nWHERE d.docType = 'dao_proposal'\nRETURN p.title, p.status\nLIMIT 20"
        );
    }

    #[test]
    fn test_continuation_lines_are_kept() {
        let raw = "MATCH (w:Wallet)-[r:HOLDS]->(t:Token)\n  WHERE toLower(t.symbol) = 'aury'\n  RETURN w.address, r.amount\n  ORDER BY r.amount DESC\n  LIMIT 10";
        assert_eq!(sanitize(raw).text.lines().count(), 5);
    }

    #[test]
    fn test_inline_label_is_stripped() {
        let out = sanitize("Cypher: MATCH (n:NftItem) RETURN n.priceSOL LIMIT 5");
        assert_eq!(out.text, "MATCH (n:NftItem) RETURN n.priceSOL LIMIT 5");

        let out = sanitize("Query:\n`MATCH (p:Proposal) RETURN p.title`");
        assert_eq!(out.text, "MATCH (p:Proposal) RETURN p.title");
    }

    #[test]
    fn test_commentary_ends_continuation() {
        let raw = "MATCH (t:Token)\nRETURN t.name\nThe above is correct per the schema.\nnot part of the query";
        assert_eq!(sanitize(raw).text, "MATCH (t:Token)\nRETURN t.name");
    }

    #[test]
    fn test_clause_mentioning_commentary_words_is_kept() {
        let raw = "MATCH (d:Document)\nWHERE toLower(d.content) CONTAINS 'correction'\nRETURN d.title\nLIMIT 5";
        assert_eq!(sanitize(raw).text, raw);

        let raw = "MATCH (n:NftItem)\nWHERE n.collection = 'schema-breakers'\nRETURN n.priceSOL";
        assert_eq!(sanitize(raw).text, raw);
    }

    #[test]
    fn test_regex_fallback_for_mid_line_query() {
        let raw = "I would use MATCH (t:Token) RETURN t.symbol\n\nthanks";
        let out = sanitize(raw);
        assert_eq!(out.strategy, SanitizeStrategy::RegexFallback);
        assert_eq!(out.text, "MATCH (t:Token) RETURN t.symbol");
    }

    #[test]
    fn test_verbatim_when_nothing_looks_like_cypher() {
        let out = sanitize("  I cannot help with that  ");
        assert_eq!(out.strategy, SanitizeStrategy::Verbatim);
        assert_eq!(out.text, "I cannot help with that");
        assert!(sanitize("   \n ").is_empty());
    }

    #[test]
    fn test_lowercase_keywords_accepted() {
        let out = sanitize("match (t:Token)\nreturn t.name");
        assert_eq!(out.text, "match (t:Token)\nreturn t.name");
    }

    #[test]
    fn test_keyword_needs_word_boundary() {
        // "Matches" is not MATCH
        let out = sanitize("Matches found below\nMATCH (n) RETURN n");
        assert_eq!(out.text, "MATCH (n) RETURN n");
    }

    #[test]
    fn test_idempotence() {
        for raw in [
            "Here is the answer:\nMATCH (t:Token) RETURN t.name LIMIT 5",
            "```\nMATCH (n)\nRETURN n\n```",
            "Query: ` `MATCH (n) RETURN n` `",
            "I would use MATCH (t:Token) RETURN t.symbol\nThe end",
            "See MATCH (n:Schema) RETURN n",
            "MATCH (d:Document)\nWHERE d.content CONTAINS 'correct'\nRETURN d",
            "nothing to see",
            "",
            "MATCH (a)\n\n\nRETURN a\nextra words",
        ] {
            assert_idempotent(raw);
        }
    }
}
