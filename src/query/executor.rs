//! Query execution behind the read-only gate.
//!
//! Provides isolated query execution that can be tested independently
//! of the agent loop.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{AgentError, Result};
use crate::safety::validate_sql;
use crate::warehouse::{QueryJobConfig, RowMap, WarehouseClient};

/// Runs candidate queries against the warehouse once they pass the SQL gate.
///
/// Holds no state between calls; the warehouse client is borrowed.
pub struct QueryExecutor<'a> {
    warehouse: &'a dyn WarehouseClient,
}

impl<'a> QueryExecutor<'a> {
    /// Creates a new query executor.
    pub fn new(warehouse: &'a dyn WarehouseClient) -> Self {
        Self { warehouse }
    }

    /// Validates and executes a query, returning every row as a column map.
    ///
    /// Rejected queries never reach the warehouse. Accepted ones always carry
    /// the fixed byte budget. Warehouse failures come back as
    /// [`AgentError::Execution`] and are not retried: each submission may be
    /// billed.
    pub async fn execute(&self, sql: &str) -> Result<Vec<RowMap>> {
        let sql = validate_sql(sql).map_err(|e| {
            warn!(kind = %e.kind(), "Rejected candidate query");
            debug!(sql, "Rejected SQL");
            e
        })?;

        let budget = QueryJobConfig::safety_budget();
        debug!(sql, "Submitting query");
        info!(
            sql_len = sql.len(),
            maximum_bytes_billed = budget.maximum_bytes_billed,
            "Executing validated query"
        );

        let start = Instant::now();
        let result = self.warehouse.query(sql, &budget).await.map_err(|e| {
            warn!(duration_ms = start.elapsed().as_millis(), error = %e, "Query failed");
            match e {
                AgentError::Execution(_) => e,
                other => AgentError::execution(other.to_string()),
            }
        })?;

        info!(
            duration_ms = start.elapsed().as_millis(),
            row_count = result.row_count(),
            bytes_processed = result.total_bytes_processed,
            job_id = result.job_id.as_deref(),
            "Query complete"
        );

        result.into_records()
    }
}
