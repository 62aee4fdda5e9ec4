// ABOUTME: Default Cypher generation template for questions outside the specialised categories

/// System message sent with every generation request
pub const CYPHER_SYSTEM_PROMPT: &str = "You translate questions about a Play-to-Earn game economy into read-only Neo4j Cypher queries. Reply with the query only.";

pub const GENERAL_TEMPLATE: &str = concat!(
    r#"You are an expert Neo4j developer specialised in a Play-to-Earn game economy (tokens, NFTs, wallets, DAO governance and social media coverage).
Translate the user question into an efficient Cypher query that strictly follows the provided schema and relationship types.

"#,
    cypher_guidelines!(),
    r#"
Example queries:

Documents with high influence scores:
MATCH (d:Document)-[:DISCUSSES|REFERENCES|POTENTIAL_IMPACT]->(t:Token)
WHERE d.influenceScore IS NOT NULL
RETURN d.content, d.influenceScore, t.name
ORDER BY d.influenceScore DESC
LIMIT 5

Game mechanics mentioned in documents:
MATCH (d:Document)-[:MENTIONS]->(gm:GameMechanic)
RETURN d.content, gm.name, gm.description
LIMIT 10
"#,
    schema_and_question!()
);
