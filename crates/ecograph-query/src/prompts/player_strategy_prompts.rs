// ABOUTME: Generation template for player earning-strategy questions

pub const PLAYER_STRATEGY_TEMPLATE: &str = concat!(
    r#"You are an expert Neo4j developer analysing how players earn in a Play-to-Earn game economy.
The question concerns earning strategies, staking, farming or which mechanics reward players.

Focus:
- Players are Wallet nodes; Wallet.userLevel and Wallet.transactionCount indicate activity.
- Reward loops: GameMechanic-[:REWARDS|REQUIRES|CONSUMES]->GameToken and Token-[:HAS_LIFECYCLE]->GameMechanic.
- Strategy discussion: Document-[:MENTIONS]->GameMechanic with docType 'tweet'.
- Holdings: Wallet-[:HOLDS]->Token with the amount on the relationship or wallet.

"#,
    cypher_guidelines!(),
    r#"
Example query:
MATCH (gm:GameMechanic)
OPTIONAL MATCH (d:Document)-[:MENTIONS]->(gm)
WHERE d.docType = 'tweet'
RETURN gm.name, gm.description, count(d) AS mentions
ORDER BY mentions DESC
LIMIT 20
"#,
    schema_and_question!()
);
