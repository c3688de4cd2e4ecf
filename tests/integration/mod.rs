//! Integration tests for bq-agent.

pub mod agent_test;
pub mod bigquery_live_test;
pub mod executor_test;
pub mod guard_test;
