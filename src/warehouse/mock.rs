//! Stub warehouse clients for testing.
//!
//! Record every submitted job so tests can assert on what reached the engine.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{ColumnInfo, QueryJobConfig, QueryResult, Value, WarehouseClient};
use crate::error::{AgentError, Result};
use async_trait::async_trait;

/// A job as seen by a stub engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedQuery {
    pub sql: String,
    pub config: QueryJobConfig,
}

/// A warehouse client that returns a canned result for every query.
pub struct MockWarehouseClient {
    result: QueryResult,
    calls: Mutex<Vec<RecordedQuery>>,
}

impl MockWarehouseClient {
    /// Creates a mock returning a small sample of the transactions table.
    pub fn new() -> Self {
        Self::with_result(sample_transactions())
    }

    /// Creates a mock returning `result` for every query.
    pub fn with_result(result: QueryResult) -> Self {
        Self {
            result,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every job submitted so far, in order.
    pub fn calls(&self) -> Vec<RecordedQuery> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl Default for MockWarehouseClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WarehouseClient for MockWarehouseClient {
    async fn query(&self, sql: &str, config: &QueryJobConfig) -> Result<QueryResult> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(RecordedQuery {
                sql: sql.to_string(),
                config: *config,
            });
        Ok(self.result.clone())
    }
}

/// A warehouse client that fails every query with an execution error.
pub struct FailingWarehouseClient {
    message: String,
    calls: AtomicUsize,
}

impl FailingWarehouseClient {
    /// Creates a client that fails with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Simulates the engine refusing a job that would exceed its byte ceiling.
    pub fn quota_exceeded() -> Self {
        Self::new(
            "BigQuery error (bytesBilledLimitExceeded): Query exceeded limit for bytes billed: 5368709120",
        )
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WarehouseClient for FailingWarehouseClient {
    async fn query(&self, _sql: &str, _config: &QueryJobConfig) -> Result<QueryResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AgentError::execution(self.message.clone()))
    }
}

fn sample_transactions() -> QueryResult {
    QueryResult::with_data(
        vec![
            ColumnInfo::new("order_id", "STRING"),
            ColumnInfo::new("order_date", "DATE"),
            ColumnInfo::new("region", "STRING"),
            ColumnInfo::new("product", "STRING"),
            ColumnInfo::new("amount", "FLOAT64"),
        ],
        vec![
            vec![
                Value::from("A-1001"),
                Value::from("2024-03-01"),
                Value::from("EMEA"),
                Value::from("Widget"),
                Value::Float(120.0),
            ],
            vec![
                Value::from("A-1002"),
                Value::from("2024-03-02"),
                Value::from("APAC"),
                Value::from("Gadget"),
                Value::Float(75.5),
            ],
        ],
    )
}
