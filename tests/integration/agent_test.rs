//! End-to-end agent tests with the mock LLM and stub warehouse.

use std::sync::Arc;

use bq_agent::agent::Agent;
use bq_agent::config::TableTarget;
use bq_agent::llm::{
    build_system_prompt, execute_tool_call, MockLlmClient, ToolCall, RUN_BIGQUERY_TOOL,
};
use bq_agent::query::QueryExecutor;
use bq_agent::schema::TableSchema;
use bq_agent::warehouse::{FailingWarehouseClient, MockWarehouseClient};

fn target() -> TableTarget {
    TableTarget::new("acme-analytics", "sales", "transactions")
}

fn tool_call(sql: &str) -> ToolCall {
    ToolCall {
        id: "call_1".to_string(),
        name: RUN_BIGQUERY_TOOL.to_string(),
        arguments: serde_json::json!({ "sql": sql }).to_string(),
    }
}

#[tokio::test]
async fn test_question_runs_one_query_with_budget() {
    let warehouse = Arc::new(MockWarehouseClient::new());
    let mut agent = Agent::new(
        Box::new(MockLlmClient::new()),
        Box::new(Arc::clone(&warehouse)),
        &target(),
    );

    let answer = agent.ask("What are total sales by region?").await.unwrap();

    assert!(answer.contains("returned 2 row(s)"));
    let calls = warehouse.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].sql.starts_with("SELECT region"));
    assert_eq!(calls[0].config.maximum_bytes_billed, 5_368_709_120);
}

#[tokio::test]
async fn test_mutating_request_never_reaches_warehouse() {
    let warehouse = Arc::new(MockWarehouseClient::new());
    let mut agent = Agent::new(
        Box::new(MockLlmClient::new()),
        Box::new(Arc::clone(&warehouse)),
        &target(),
    );

    let answer = agent.ask("Delete all refunded orders").await.unwrap();

    assert!(answer.contains("Only SELECT queries allowed"));
    assert_eq!(warehouse.call_count(), 0);
}

#[tokio::test]
async fn test_engine_failure_is_reported_not_retried() {
    let warehouse = Arc::new(FailingWarehouseClient::quota_exceeded());
    let mut agent = Agent::new(
        Box::new(MockLlmClient::new()),
        Box::new(Arc::clone(&warehouse)),
        &target(),
    );

    let answer = agent.ask("Sales by product please").await.unwrap();

    assert!(answer.starts_with("I couldn't run that query."));
    assert!(answer.contains("Execution error"));
    assert_eq!(warehouse.call_count(), 1);
}

#[tokio::test]
async fn test_tool_call_renders_validation_error_for_model() {
    let warehouse = MockWarehouseClient::new();
    let executor = QueryExecutor::new(&warehouse);

    let result = execute_tool_call(&executor, &tool_call("SELECT * FROM t; DROP TABLE t")).await;
    let payload: serde_json::Value = serde_json::from_str(&result.content).unwrap();

    assert_eq!(result.tool_call_id, "call_1");
    assert_eq!(payload["kind"], "ForbiddenKeyword");
    assert_eq!(payload["error"], "Validation error: Unsafe SQL detected");
    assert_eq!(warehouse.call_count(), 0);
}

#[tokio::test]
async fn test_tool_call_returns_rows_as_json() {
    let warehouse = MockWarehouseClient::new();
    let executor = QueryExecutor::new(&warehouse);

    let result = execute_tool_call(&executor, &tool_call("SELECT * FROM transactions")).await;
    let payload: serde_json::Value = serde_json::from_str(&result.content).unwrap();

    let rows = payload.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["region"], "APAC");
}

#[tokio::test]
async fn test_run_sql_bypasses_model() {
    let warehouse = Arc::new(MockWarehouseClient::new());
    let agent = Agent::new(
        Box::new(MockLlmClient::new()),
        Box::new(Arc::clone(&warehouse)),
        &target(),
    );

    let rows = agent.run_sql("select order_id from transactions").await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(warehouse.call_count(), 1);
}

#[test]
fn test_system_prompt_documents_target_table() {
    let prompt = build_system_prompt(&target(), &TableSchema::transactions());

    assert!(prompt.contains("`acme-analytics.sales.transactions`"));
    assert!(prompt.contains("order_date"));
    assert!(prompt.contains("amount"));
}
