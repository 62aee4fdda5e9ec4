// ABOUTME: Runs a sanitized query against the graph store and bounds what is forwarded
// ABOUTME: Caps rows at top_k, then trims the tail until the serialized rows fit max_result_bytes

use crate::error::{PipelineError, Result};
use ecograph_graph::{Row, StoreHandle};
use serde::Serialize;
use tracing::{debug, info, warn};

const EXECUTOR_LOG_TARGET: &str = "ecograph::query::executor";

pub const DEFAULT_TOP_K: usize = 10;
pub const DEFAULT_MAX_RESULT_BYTES: usize = 20_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    pub rows: Vec<Row>,
    /// Rows the store returned before any truncation
    pub total_rows: usize,
}

impl ExecutionResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn truncated(&self) -> bool {
        self.rows.len() < self.total_rows
    }
}

#[derive(Debug, Clone)]
pub struct QueryExecutor {
    top_k: usize,
    max_result_bytes: usize,
}

impl Default for QueryExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_K, DEFAULT_MAX_RESULT_BYTES)
    }
}

impl QueryExecutor {
    /// `top_k` of 0 is treated as 1
    pub fn new(top_k: usize, max_result_bytes: usize) -> Self {
        Self {
            top_k: top_k.max(1),
            max_result_bytes,
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub async fn execute(&self, store: &StoreHandle, query: &str) -> Result<ExecutionResult> {
        let store = match store {
            StoreHandle::Connected(store) => store,
            StoreHandle::Unavailable { reason } => {
                warn!(
                    target: EXECUTOR_LOG_TARGET,
                    reason = %reason,
                    "Skipping execution: graph store unavailable"
                );
                return Err(PipelineError::StoreUnavailable {
                    reason: reason.clone(),
                });
            }
        };

        debug!(target: EXECUTOR_LOG_TARGET, backend = store.backend_name(), "Running query");

        let batch = store.run(query, self.top_k).await.map_err(|e| {
            warn!(target: EXECUTOR_LOG_TARGET, error = %e, "Query execution failed");
            PipelineError::ExecutionFailure {
                query: query.to_string(),
                reason: e.to_string(),
            }
        })?;

        let total_rows = batch.total_rows;
        let mut rows = batch.rows;
        rows.truncate(self.top_k);
        let rows = self.truncate_if_oversized(rows);

        info!(
            target: EXECUTOR_LOG_TARGET,
            total_rows,
            kept_rows = rows.len(),
            "Query executed"
        );

        Ok(ExecutionResult { rows, total_rows })
    }

    /// Drop rows from the tail until the JSON form fits, keeping at least one
    fn truncate_if_oversized(&self, mut rows: Vec<Row>) -> Vec<Row> {
        let mut sizes: Vec<usize> = rows.iter().map(row_bytes).collect();
        let result_bytes: usize = sizes.iter().sum();
        if result_bytes <= self.max_result_bytes {
            return rows;
        }

        let original = rows.len();
        let mut kept_bytes = result_bytes;
        while rows.len() > 1 && kept_bytes > self.max_result_bytes {
            rows.pop();
            kept_bytes -= sizes.pop().unwrap_or(0);
        }

        warn!(
            target: EXECUTOR_LOG_TARGET,
            result_bytes,
            max_bytes = self.max_result_bytes,
            original_rows = original,
            kept_rows = rows.len(),
            "Query result exceeds max_result_bytes limit, truncating"
        );
        rows
    }
}

fn row_bytes(row: &Row) -> usize {
    serde_json::to_string(row).map(|s| s.len()).unwrap_or(0)
}
