// ABOUTME: Graph schema description handed to the query-generation prompt
// ABOUTME: Curated game-economy schema with optional live label inventory from the store

use crate::store::{GraphStore, StoreHandle};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt::Write as _;
use tracing::{debug, warn};

const SCHEMA_TARGET: &str = "ecograph::schema";

const LABELS_QUERY: &str = "CALL db.labels() YIELD label RETURN collect(label) AS labels";
const RELATIONSHIP_TYPES_QUERY: &str =
    "CALL db.relationshipTypes() YIELD relationshipType RETURN collect(relationshipType) AS types";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySpec {
    pub name: String,
    pub description: Option<String>,
    /// Listed in the compact view built from a live inventory
    pub key: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub label: String,
    pub properties: Vec<PropertySpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipSpec {
    pub from: String,
    pub types: Vec<String>,
    pub to: String,
}

/// Labels and relationship types as reported by the running database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveInventory {
    pub labels: Vec<String>,
    pub relationship_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    pub nodes: Vec<NodeSpec>,
    pub relationships: Vec<RelationshipSpec>,
    pub live: Option<LiveInventory>,
}

impl Default for SchemaDescriptor {
    fn default() -> Self {
        Self::game_economy()
    }
}

impl SchemaDescriptor {
    /// The curated schema of the game-economy graph
    pub fn game_economy() -> Self {
        let nodes = vec![
            node(
                "Document",
                &[
                    ("content", Some("text content"), true),
                    ("docType", Some("tweet, news, dao_proposal"), true),
                    ("title", Some("document title"), false),
                    ("source", Some("source URL or identifier"), false),
                    ("timestamp", Some("creation/publication time"), false),
                    ("influenceScore", Some("numeric influence score"), true),
                    ("eventType", Some("type of event"), true),
                    ("economicSignificance", Some("economic impact assessment"), false),
                    ("socialImpact", Some("social media impact metrics"), false),
                    ("tweet_id", Some("for Twitter documents"), false),
                    ("proposalId", Some("for DAO proposal documents"), false),
                ],
            ),
            node(
                "Token",
                &[
                    ("name", None, true),
                    ("symbol", None, true),
                    ("coinType", None, false),
                    ("volume24hUsd", None, true),
                    ("percentChange24h", None, false),
                    ("marketCapUsd", None, true),
                ],
            ),
            node(
                "Wallet",
                &[
                    ("address", None, true),
                    ("amount", None, true),
                    ("userLevel", None, true),
                    ("transactionCount", None, false),
                ],
            ),
            node(
                "Transaction",
                &[
                    ("signature", None, true),
                    ("timestamp", None, true),
                    ("fee", None, true),
                    ("slot", None, false),
                ],
            ),
            node(
                "NftItem",
                &[
                    ("id", None, false),
                    ("priceSOL", None, true),
                    ("timestamp", None, true),
                    ("status", None, true),
                    ("collection", None, false),
                ],
            ),
            node(
                "Proposal",
                &[
                    ("title", None, true),
                    ("proposalId", None, false),
                    ("status", None, true),
                ],
            ),
            node(
                "Council",
                &[("description", None, false), ("electionCycle", None, false)],
            ),
            node(
                "GameMechanic",
                &[("name", None, false), ("description", None, false)],
            ),
            node(
                "CommunityMember",
                &[
                    ("twitter", None, false),
                    ("name", None, false),
                    ("role", None, false),
                ],
            ),
            node("GameToken", &[]),
        ];

        let relationships = vec![
            rel("Document", &["DISCUSSES", "REFERENCES", "POTENTIAL_IMPACT"], "Token"),
            rel("Document", &["MENTIONS"], "GameMechanic"),
            rel("Document", &["ABOUT"], "NftItem"),
            rel("Document", &["DESCRIBES"], "Proposal"),
            rel("Wallet", &["HOLDS"], "Token"),
            rel("Wallet", &["SELLS"], "NftItem"),
            rel("Wallet", &["BUYS"], "NftItem"),
            rel("Wallet", &["PERFORMED"], "Transaction"),
            rel("Token", &["HAS_SUBTOKEN"], "GameToken"),
            rel("Token", &["HAS_LIFECYCLE"], "GameMechanic"),
            rel("GameMechanic", &["REQUIRES"], "GameToken"),
            rel("GameMechanic", &["REWARDS"], "GameToken"),
            rel("GameMechanic", &["CONSUMES"], "GameToken"),
            rel("Council", &["MEMBER_OF"], "CommunityMember"),
            rel("CommunityMember", &["OWNS"], "Wallet"),
        ];

        Self {
            nodes,
            relationships,
            live: None,
        }
    }

    /// Static schema, or a compact live view when `live` is set and the store answers.
    ///
    /// Never fails: introspection problems fall back to the static schema.
    pub async fn resolve(store: &StoreHandle, live: bool) -> Self {
        let schema = Self::game_economy();
        if !live {
            return schema;
        }

        let Some(store) = store.store() else {
            warn!(
                target: SCHEMA_TARGET,
                "Live schema requested but graph store is unavailable; using static schema"
            );
            return schema;
        };

        match fetch_inventory(store.as_ref()).await {
            Ok(inventory) => {
                debug!(
                    target: SCHEMA_TARGET,
                    labels = inventory.labels.len(),
                    relationship_types = inventory.relationship_types.len(),
                    "Loaded live schema inventory"
                );
                schema.with_live(inventory)
            }
            Err(reason) => {
                warn!(
                    target: SCHEMA_TARGET,
                    error = %reason,
                    "Schema introspection failed; using static schema"
                );
                schema
            }
        }
    }

    pub fn with_live(mut self, inventory: LiveInventory) -> Self {
        self.live = Some(inventory);
        self
    }

    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    /// Text substituted for `{schema}` in generation prompts
    pub fn render(&self) -> String {
        match &self.live {
            Some(inventory) => self.render_compact(inventory),
            None => self.render_full(),
        }
    }

    fn render_full(&self) -> String {
        let mut out = String::from("Nodes:\n");
        for node in &self.nodes {
            if node.properties.is_empty() {
                let _ = writeln!(out, "- {}", node.label);
                continue;
            }
            let props = node
                .properties
                .iter()
                .map(|p| match &p.description {
                    Some(desc) => format!("{} ({})", p.name, desc),
                    None => p.name.clone(),
                })
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "- {} (properties: {})", node.label, props);
        }

        out.push_str("\nRelationships:\n");
        for rel in &self.relationships {
            let _ = writeln!(out, "- {}-[:{}]->{}", rel.from, rel.types.join("|"), rel.to);
        }
        out
    }

    fn render_compact(&self, inventory: &LiveInventory) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Node Labels: {}", inventory.labels.join(", "));
        let _ = writeln!(
            out,
            "Relationship Types: {}",
            inventory.relationship_types.join(", ")
        );
        out.push_str("\nKey Properties per Node:\n");
        for node in &self.nodes {
            let keys: Vec<&str> = node
                .properties
                .iter()
                .filter(|p| p.key)
                .map(|p| p.name.as_str())
                .collect();
            if !keys.is_empty() {
                let _ = writeln!(out, "- {}: {}", node.label, keys.join(", "));
            }
        }
        out
    }
}

/// Both procedures answer with a single collected row
const INTROSPECTION_ROW_CAP: usize = 1;

async fn fetch_inventory(store: &dyn GraphStore) -> Result<LiveInventory, String> {
    let labels = collect_strings(store, LABELS_QUERY, "labels").await?;
    let relationship_types = collect_strings(store, RELATIONSHIP_TYPES_QUERY, "types").await?;
    Ok(LiveInventory {
        labels,
        relationship_types,
    })
}

async fn collect_strings(
    store: &dyn GraphStore,
    cypher: &str,
    column: &str,
) -> Result<Vec<String>, String> {
    let batch = store
        .run(cypher, INTROSPECTION_ROW_CAP)
        .await
        .map_err(|e| e.to_string())?;
    let values = batch
        .rows
        .first()
        .and_then(|row| row.get(column))
        .and_then(JsonValue::as_array)
        .ok_or_else(|| format!("column '{}' missing from introspection result", column))?;

    Ok(values
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect())
}

fn node(label: &str, properties: &[(&str, Option<&str>, bool)]) -> NodeSpec {
    NodeSpec {
        label: label.to_string(),
        properties: properties
            .iter()
            .map(|(name, description, key)| PropertySpec {
                name: name.to_string(),
                description: description.map(str::to_string),
                key: *key,
            })
            .collect(),
    }
}

fn rel(from: &str, types: &[&str], to: &str) -> RelationshipSpec {
    RelationshipSpec {
        from: from.to_string(),
        types: types.iter().map(|t| t.to_string()).collect(),
        to: to.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_render_lists_nodes_and_relationships() {
        let text = SchemaDescriptor::game_economy().render();
        assert!(text.starts_with("Nodes:\n"));
        assert!(text.contains("- Token (properties: name, symbol, coinType"));
        assert!(text.contains("docType (tweet, news, dao_proposal)"));
        assert!(text.contains("- GameToken\n"));
        assert!(text.contains("- Document-[:DISCUSSES|REFERENCES|POTENTIAL_IMPACT]->Token"));
        assert!(text.contains("- CommunityMember-[:OWNS]->Wallet"));
    }

    #[test]
    fn test_compact_render_uses_key_properties() {
        let schema = SchemaDescriptor::game_economy().with_live(LiveInventory {
            labels: vec!["Token".to_string(), "Wallet".to_string()],
            relationship_types: vec!["HOLDS".to_string()],
        });
        let text = schema.render();

        assert!(text.starts_with("Node Labels: Token, Wallet\n"));
        assert!(text.contains("Relationship Types: HOLDS"));
        assert!(text.contains("- Token: name, symbol, volume24hUsd, marketCapUsd"));
        assert!(!text.contains("coinType"));
        assert!(!text.contains("- Council:"));
    }

    #[tokio::test]
    async fn test_static_when_live_disabled() {
        let schema = SchemaDescriptor::resolve(&StoreHandle::unavailable("down"), false).await;
        assert!(!schema.is_live());
    }

    #[tokio::test]
    async fn test_unavailable_store_falls_back() {
        let schema = SchemaDescriptor::resolve(&StoreHandle::unavailable("down"), true).await;
        assert_eq!(schema, SchemaDescriptor::game_economy());
    }
}
