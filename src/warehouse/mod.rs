//! Warehouse abstraction layer for bq-agent.
//!
//! Provides a trait-based interface to the analytical query engine so the
//! executor can run against BigQuery in production and against stubs in tests.

mod bigquery;
mod mock;
mod types;

pub use bigquery::{BigQueryClient, BigQueryConfig};
pub use mock::{FailingWarehouseClient, MockWarehouseClient, RecordedQuery};
pub use types::{ColumnInfo, QueryResult, Row, RowMap, Value};

use crate::config::WarehouseConfig;
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Maximum bytes a single query may bill (5 GiB).
pub const SAFETY_BUDGET_BYTES: u64 = 5 * 1024 * 1024 * 1024;

/// Per-job settings submitted alongside the SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueryJobConfig {
    /// Hard ceiling on billed bytes; the engine fails the job rather than exceed it.
    pub maximum_bytes_billed: u64,
}

impl QueryJobConfig {
    /// The fixed budget attached to every execution.
    pub fn safety_budget() -> Self {
        Self {
            maximum_bytes_billed: SAFETY_BUDGET_BYTES,
        }
    }
}

/// Creates a BigQuery-backed warehouse client from configuration.
pub fn connect(config: &WarehouseConfig) -> Result<Box<dyn WarehouseClient>> {
    let client = BigQueryClient::from_config(config)?;
    Ok(Box::new(client))
}

/// Trait defining the interface for warehouse engines.
///
/// `query` blocks until the job has finished and all result pages are in
/// memory. Implementations must not retry or resubmit a failed job.
#[async_trait]
pub trait WarehouseClient: Send + Sync {
    /// Executes `sql` under `config` and returns the complete result set.
    async fn query(&self, sql: &str, config: &QueryJobConfig) -> Result<QueryResult>;
}

#[async_trait]
impl<T: WarehouseClient + ?Sized> WarehouseClient for std::sync::Arc<T> {
    async fn query(&self, sql: &str, config: &QueryJobConfig) -> Result<QueryResult> {
        (**self).query(sql, config).await
    }
}
