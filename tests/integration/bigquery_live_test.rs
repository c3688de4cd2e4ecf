//! Live BigQuery tests.
//!
//! Require BQ_PROJECT and GOOGLE_OAUTH_ACCESS_TOKEN. Queries touch no tables,
//! so they bill nothing.

use bq_agent::config::WarehouseConfig;
use bq_agent::query::QueryExecutor;
use bq_agent::warehouse::{BigQueryClient, Value};

/// Helper to create a live client from the environment.
fn get_test_client() -> Option<BigQueryClient> {
    std::env::var("GOOGLE_OAUTH_ACCESS_TOKEN").ok()?;
    let mut config = WarehouseConfig::default();
    config.apply_env_defaults();
    config.project.as_ref()?;
    BigQueryClient::from_config(&config).ok()
}

#[tokio::test]
async fn test_live_select_literals() {
    let Some(client) = get_test_client() else {
        eprintln!("Skipping test: BQ_PROJECT or GOOGLE_OAUTH_ACCESS_TOKEN not set");
        return;
    };
    let executor = QueryExecutor::new(&client);

    let rows = executor
        .execute("SELECT 1 AS num, 'hello' AS greeting, TRUE AS flag")
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].columns().collect::<Vec<_>>(), vec!["num", "greeting", "flag"]);
    assert_eq!(rows[0].get("num"), Some(&Value::Int(1)));
    assert_eq!(rows[0].get("greeting"), Some(&Value::from("hello")));
    assert_eq!(rows[0].get("flag"), Some(&Value::Bool(true)));
}

#[tokio::test]
async fn test_live_syntax_error_is_execution_error() {
    let Some(client) = get_test_client() else {
        eprintln!("Skipping test: BQ_PROJECT or GOOGLE_OAUTH_ACCESS_TOKEN not set");
        return;
    };
    let executor = QueryExecutor::new(&client);

    let err = executor.execute("SELECT FROM WHERE").await.unwrap_err();
    assert!(err.is_execution());
}

#[tokio::test]
async fn test_live_rows_come_back_in_order() {
    let Some(client) = get_test_client() else {
        eprintln!("Skipping test: BQ_PROJECT or GOOGLE_OAUTH_ACCESS_TOKEN not set");
        return;
    };
    let executor = QueryExecutor::new(&client);

    let rows = executor
        .execute("SELECT n FROM UNNEST(GENERATE_ARRAY(1, 5)) AS n ORDER BY n DESC")
        .await
        .unwrap();

    let values: Vec<_> = rows.iter().filter_map(|r| r.get("n").cloned()).collect();
    assert_eq!(
        values,
        vec![Value::Int(5), Value::Int(4), Value::Int(3), Value::Int(2), Value::Int(1)]
    );
}
