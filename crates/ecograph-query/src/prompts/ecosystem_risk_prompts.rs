// ABOUTME: Generation template for ecosystem economic-risk questions

pub const ECOSYSTEM_RISK_TEMPLATE: &str = concat!(
    r#"You are an expert Neo4j developer assessing economic risks in a Play-to-Earn game economy.
The question concerns threats, inflation, sell pressure or other economic concerns.

Focus:
- Risk coverage: Document nodes with docType 'news' and a high economicSignificance, plus 'tweet' documents with high socialImpact.
- Token stress: negative Token.percentChange24h and falling volume24hUsd.
- Concentration: wallets holding large amounts via Wallet-[:HOLDS]->Token.
- Documents linked through POTENTIAL_IMPACT point at the affected token.

"#,
    cypher_guidelines!(),
    r#"
Example query:
MATCH (d:Document)-[:POTENTIAL_IMPACT]->(t:Token)
WHERE d.economicSignificance IS NOT NULL
RETURN t.name, d.title, d.content, d.economicSignificance
ORDER BY d.economicSignificance DESC
LIMIT 20
"#,
    schema_and_question!()
);
