// ABOUTME: Generation template for NFT market and trading questions

pub const MARKET_SENTIMENT_TEMPLATE: &str = concat!(
    r#"You are an expert Neo4j developer analysing the game's NFT market (Nefties, Aurorians) and trading activity.
The question concerns prices, floors, volume or the buzz around a collection.

Focus:
- NftItem.priceSOL, NftItem.status and NftItem.collection describe listings and sales.
- Buying and selling wallets: Wallet-[:BUYS]->NftItem and Wallet-[:SELLS]->NftItem.
- Market buzz: Document-[:ABOUT]->NftItem, filtered to docType 'tweet' or 'news'.
- A floor price is min(priceSOL) over listed items of a collection.

"#,
    cypher_guidelines!(),
    r#"
Example query:
MATCH (n:NftItem)
WHERE toLower(n.collection) CONTAINS 'neftie' AND n.priceSOL IS NOT NULL
RETURN n.collection, min(n.priceSOL) AS floorPriceSOL, count(n) AS listings
LIMIT 20
"#,
    schema_and_question!()
);
