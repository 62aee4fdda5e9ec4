// ABOUTME: Neo4j adapter for the GraphStore trait over the Bolt protocol
// ABOUTME: Converts driver rows into JSON maps so callers never see neo4rs types

use crate::error::{GraphError, Result};
use crate::store::{GraphStore, Row, RowBatch};
use async_trait::async_trait;
use ecograph_core::GraphConfig;
use neo4rs::{query, ConfigBuilder, Graph};
use std::time::Duration;
use tracing::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Neo4jStore {
    graph: Graph,
    uri: String,
}

impl Neo4jStore {
    /// Open a connection pool and verify it with a trivial query
    pub async fn connect(config: &GraphConfig) -> Result<Self> {
        let open = async {
            let graph = match &config.database {
                Some(database) => {
                    let driver_config = ConfigBuilder::default()
                        .uri(config.uri.as_str())
                        .user(config.username.as_str())
                        .password(config.password.as_str())
                        .db(database.as_str())
                        .build()
                        .map_err(|e| GraphError::Connection(e.to_string()))?;
                    Graph::connect(driver_config).await
                }
                None => {
                    Graph::new(
                        config.uri.as_str(),
                        config.username.as_str(),
                        config.password.as_str(),
                    )
                    .await
                }
            }
            .map_err(|e| GraphError::Connection(format!("Failed to connect to Neo4j: {}", e)))?;

            let store = Self {
                graph,
                uri: config.uri.clone(),
            };
            store.ping().await?;
            Ok::<_, GraphError>(store)
        };

        tokio::time::timeout(CONNECT_TIMEOUT, open)
            .await
            .map_err(|_| {
                GraphError::Connection(format!(
                    "Timed out connecting to {} after {}s",
                    config.uri,
                    CONNECT_TIMEOUT.as_secs()
                ))
            })?
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

#[async_trait]
impl GraphStore for Neo4jStore {
    async fn run(&self, cypher: &str, max_rows: usize) -> Result<RowBatch> {
        debug!(uri = %self.uri, max_rows, "Executing Cypher:\n{}", cypher);

        let mut result = self.graph.execute(query(cypher)).await?;
        let mut batch = RowBatch::default();
        while let Some(row) = result.next().await? {
            batch.total_rows += 1;
            if batch.rows.len() >= max_rows {
                continue;
            }
            let record = row
                .to::<Row>()
                .map_err(|e| GraphError::Decode(e.to_string()))?;
            batch.rows.push(record);
        }
        Ok(batch)
    }

    async fn ping(&self) -> Result<()> {
        let mut result = self
            .graph
            .execute(query("RETURN 1 AS test"))
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;
        result
            .next()
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?
            .ok_or_else(|| GraphError::Connection("Empty response to ping".to_string()))?;
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "neo4j"
    }
}
