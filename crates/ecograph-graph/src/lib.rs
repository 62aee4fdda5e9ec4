// ABOUTME: Graph store abstraction for the EcoGraph assistant
// ABOUTME: Exposes the GraphStore trait, the StoreHandle sentinel, the Neo4j adapter and the schema descriptor

pub mod error;
pub mod neo4j_store;
pub mod schema;
pub mod store;

pub use error::*;
pub use neo4j_store::Neo4jStore;
pub use schema::*;
pub use store::*;
