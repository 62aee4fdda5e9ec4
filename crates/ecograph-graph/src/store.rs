use crate::error::Result;
use crate::neo4j_store::Neo4jStore;
use async_trait::async_trait;
use ecograph_core::GraphConfig;
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// One result record keyed by column name
pub type Row = serde_json::Map<String, JsonValue>;

/// The leading rows of a result plus how many rows the query produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowBatch {
    pub rows: Vec<Row>,
    pub total_rows: usize,
}

impl RowBatch {
    /// Keep at most `max_rows` of an already collected result
    pub fn capped(mut rows: Vec<Row>, max_rows: usize) -> Self {
        let total_rows = rows.len();
        rows.truncate(max_rows);
        Self { rows, total_rows }
    }
}

#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Run a read query, decoding at most `max_rows` rows. The remainder is
    /// only counted.
    async fn run(&self, cypher: &str, max_rows: usize) -> Result<RowBatch>;

    /// Cheap round trip proving the connection is usable
    async fn ping(&self) -> Result<()>;

    fn backend_name(&self) -> &str;
}

/// Either a live store or the reason none could be reached.
///
/// Construction never fails: a failed connection becomes `Unavailable`
/// and every stage that needs the store reports it instead of calling it.
#[derive(Clone)]
pub enum StoreHandle {
    Connected(Arc<dyn GraphStore>),
    Unavailable { reason: String },
}

impl StoreHandle {
    pub async fn connect(config: &GraphConfig) -> Self {
        match Neo4jStore::connect(config).await {
            Ok(store) => {
                info!(uri = %config.uri, "Connected to graph store");
                StoreHandle::Connected(Arc::new(store))
            }
            Err(e) => {
                warn!(uri = %config.uri, error = %e, "Graph store unavailable");
                StoreHandle::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn connected(store: Arc<dyn GraphStore>) -> Self {
        StoreHandle::Connected(store)
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        StoreHandle::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn store(&self) -> Option<&Arc<dyn GraphStore>> {
        match self {
            StoreHandle::Connected(store) => Some(store),
            StoreHandle::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, StoreHandle::Connected(_))
    }
}

impl fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreHandle::Connected(store) => f
                .debug_tuple("Connected")
                .field(&store.backend_name())
                .finish(),
            StoreHandle::Unavailable { reason } => f
                .debug_struct("Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;

    struct EmptyStore;

    #[async_trait]
    impl GraphStore for EmptyStore {
        async fn run(&self, _cypher: &str, _max_rows: usize) -> Result<RowBatch> {
            Ok(RowBatch::default())
        }

        async fn ping(&self) -> Result<()> {
            Err(GraphError::Connection("down".to_string()))
        }

        fn backend_name(&self) -> &str {
            "empty"
        }
    }

    #[test]
    fn test_unavailable_has_no_store() {
        let handle = StoreHandle::unavailable("refused");
        assert!(!handle.is_available());
        assert!(handle.store().is_none());
        assert_eq!(
            format!("{:?}", handle),
            "Unavailable { reason: \"refused\" }"
        );
    }

    #[test]
    fn test_connected_exposes_store() {
        let handle = StoreHandle::connected(Arc::new(EmptyStore));
        assert!(handle.is_available());
        assert_eq!(handle.store().map(|s| s.backend_name()), Some("empty"));
    }

    #[test]
    fn test_capped_batch_counts_dropped_rows() {
        let rows: Vec<Row> = (0..4)
            .map(|i| {
                let mut row = Row::new();
                row.insert("i".to_string(), JsonValue::from(i));
                row
            })
            .collect();

        let batch = RowBatch::capped(rows, 2);
        assert_eq!(batch.rows.len(), 2);
        assert_eq!(batch.total_rows, 4);
        assert_eq!(batch.rows[1]["i"], 1);
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_is_unavailable() {
        let config = GraphConfig {
            uri: "bolt://127.0.0.1:1".to_string(),
            ..Default::default()
        };
        let handle = StoreHandle::connect(&config).await;
        assert!(!handle.is_available());
    }
}
