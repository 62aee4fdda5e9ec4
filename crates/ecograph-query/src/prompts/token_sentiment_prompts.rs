// ABOUTME: Generation template for token sentiment questions (social discussion plus price movement)

pub const TOKEN_SENTIMENT_TEMPLATE: &str = concat!(
    r#"You are an expert Neo4j developer analysing sentiment around the game's fungible tokens (AURY, XAURY, NERITE, EMBER, WISDOM).
The question asks how a token is perceived, typically combining social discussion with market data.

Focus:
- Social signal: Document nodes with docType 'tweet' or 'news' linked to Token via DISCUSSES, REFERENCES or POTENTIAL_IMPACT.
- Market signal: Token.percentChange24h, Token.volume24hUsd, Token.marketCapUsd.
- Match tokens by name or symbol case-insensitively.
- Prefer documents with higher influenceScore.

"#,
    cypher_guidelines!(),
    r#"
Example query:
MATCH (d:Document)-[:DISCUSSES|REFERENCES|POTENTIAL_IMPACT]->(t:Token)
WHERE toLower(t.symbol) = 'aury' AND d.docType IN ['tweet', 'news']
RETURN t.name, t.percentChange24h, t.volume24hUsd, d.content, d.influenceScore
ORDER BY d.influenceScore DESC
LIMIT 20
"#,
    schema_and_question!()
);
