// ABOUTME: Generation template for DAO proposal and community-response questions

pub const DAO_COMMUNITY_TEMPLATE: &str = concat!(
    r#"You are an expert Neo4j developer analysing DAO governance in a Play-to-Earn game economy.
The question is about proposals, votes, the council or how the community reacts to governance.

Focus:
- Proposals live both as Proposal nodes and as Document nodes with docType = 'dao_proposal' linked by DESCRIBES.
- "Active" proposals: filter Proposal.status case-insensitively (e.g. toLower(p.status) CONTAINS 'active').
- Community response comes from Document nodes with docType 'tweet' or 'news'; order them by influenceScore or socialImpact when present.
- Council members are reached through Council-[:MEMBER_OF]->CommunityMember.

"#,
    cypher_guidelines!(),
    r#"
Example query:
MATCH (d:Document)-[:DESCRIBES]->(p:Proposal)
WHERE d.docType = 'dao_proposal'
OPTIONAL MATCH (t:Document)
WHERE t.docType = 'tweet' AND toLower(t.content) CONTAINS 'proposal'
RETURN p.title, p.status, collect(DISTINCT t.content)[..5] AS reactions
LIMIT 20
"#,
    schema_and_question!()
);
