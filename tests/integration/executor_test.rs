//! Query executor integration tests.
//!
//! Uses recording stub warehouses to check what actually reaches the engine.

use bq_agent::query::QueryExecutor;
use bq_agent::warehouse::{
    ColumnInfo, FailingWarehouseClient, MockWarehouseClient, QueryResult, Value,
    SAFETY_BUDGET_BYTES,
};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_rejected_query_never_reaches_engine() {
    let warehouse = MockWarehouseClient::new();
    let executor = QueryExecutor::new(&warehouse);

    for sql in [
        "DELETE FROM t",
        "SELECT * FROM t; DROP TABLE t",
        "INSERT INTO t VALUES (1)",
        "merge into t using s on true when matched then delete",
    ] {
        let err = executor.execute(sql).await.unwrap_err();
        assert!(err.is_validation(), "{sql}");
    }

    assert_eq!(warehouse.call_count(), 0);
}

#[tokio::test]
async fn test_accepted_query_carries_budget_and_original_text() {
    let warehouse = MockWarehouseClient::new();
    let executor = QueryExecutor::new(&warehouse);
    let sql = "  SELECT region FROM t  ";

    executor.execute(sql).await.unwrap();

    let calls = warehouse.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].sql, sql);
    assert_eq!(calls[0].config.maximum_bytes_billed, SAFETY_BUDGET_BYTES);
    assert_eq!(calls[0].config.maximum_bytes_billed, 5_368_709_120);
}

#[tokio::test]
async fn test_rows_keep_engine_order_and_column_names() {
    let result = QueryResult::with_data(
        vec![ColumnInfo::new("region", "STRING"), ColumnInfo::new("total", "FLOAT64")],
        vec![
            vec![Value::from("EMEA"), Value::Float(300.0)],
            vec![Value::from("APAC"), Value::Float(120.5)],
            vec![Value::from("AMER"), Value::Null],
        ],
    );
    let warehouse = MockWarehouseClient::with_result(result);
    let executor = QueryExecutor::new(&warehouse);

    let rows = executor
        .execute("SELECT region, SUM(amount) AS total FROM t GROUP BY region")
        .await
        .unwrap();

    assert_eq!(rows.len(), 3);
    let regions: Vec<_> = rows.iter().map(|r| r.get("region").cloned()).collect();
    assert_eq!(
        regions,
        vec![
            Some(Value::from("EMEA")),
            Some(Value::from("APAC")),
            Some(Value::from("AMER")),
        ]
    );
    assert_eq!(rows[0].columns().collect::<Vec<_>>(), vec!["region", "total"]);
    assert_eq!(rows[2].get("total"), Some(&Value::Null));
}

#[tokio::test]
async fn test_empty_result_is_empty_list() {
    let warehouse = MockWarehouseClient::with_result(QueryResult::new());
    let executor = QueryExecutor::new(&warehouse);

    let rows = executor.execute("SELECT * FROM t WHERE 1 = 0").await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_quota_failure_is_execution_error_without_retry() {
    let warehouse = FailingWarehouseClient::quota_exceeded();
    let executor = QueryExecutor::new(&warehouse);

    let err = executor.execute("SELECT * FROM huge_table").await.unwrap_err();

    assert!(err.is_execution());
    assert!(err.to_string().contains("bytesBilledLimitExceeded"));
    assert_eq!(warehouse.call_count(), 1);
}

#[tokio::test]
async fn test_rows_serialize_as_plain_json_objects() {
    let warehouse = MockWarehouseClient::new();
    let executor = QueryExecutor::new(&warehouse);

    let rows = executor.execute("SELECT * FROM transactions").await.unwrap();
    let json = serde_json::to_value(&rows).unwrap();

    assert_eq!(
        json[0],
        serde_json::json!({
            "order_id": "A-1001",
            "order_date": "2024-03-01",
            "region": "EMEA",
            "product": "Widget",
            "amount": 120.0
        })
    );
}
