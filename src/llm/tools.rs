//! LLM tool definitions for function calling.
//!
//! The model gets exactly one tool, `run_bigquery`, which runs a read-only
//! query through the [`QueryExecutor`].

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::{AgentError, Result};
use crate::llm::types::{ToolCall, ToolResult};
use crate::query::QueryExecutor;
use crate::warehouse::RowMap;

/// Name of the query tool as the model sees it.
pub const RUN_BIGQUERY_TOOL: &str = "run_bigquery";

/// Tool definition for LLM function calling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Input parameters for the run_bigquery tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunBigQueryInput {
    pub sql: String,
}

/// Returns the tool definitions available to the LLM.
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    vec![ToolDefinition {
        name: RUN_BIGQUERY_TOOL.to_string(),
        description: "Executes a safe SELECT query on BigQuery and returns rows. \
                      Only single SELECT statements are accepted; anything that could \
                      modify data is rejected before execution."
            .to_string(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "sql": {
                    "type": "string",
                    "description": "A BigQuery Standard SQL SELECT statement"
                }
            },
            "required": ["sql"]
        }),
    }]
}

/// The `run_bigquery` tool: validate, execute, and return rows as column maps.
pub async fn run_bigquery(executor: &QueryExecutor<'_>, sql: &str) -> Result<Vec<RowMap>> {
    executor.execute(sql).await
}

/// Executes a model-requested tool call and renders the outcome as JSON.
///
/// Rows become a JSON array of objects. Failures become an `error` object the
/// model can explain to the user; nothing is retried.
pub async fn execute_tool_call(executor: &QueryExecutor<'_>, call: &ToolCall) -> ToolResult {
    let start = Instant::now();
    tracing::debug!(tool_name = %call.name, "Executing tool");

    let content = match call.name.as_str() {
        RUN_BIGQUERY_TOOL => match serde_json::from_str::<RunBigQueryInput>(&call.arguments) {
            Ok(input) => match run_bigquery(executor, &input.sql).await {
                Ok(rows) => serde_json::to_string(&rows)
                    .unwrap_or_else(|e| error_payload(&AgentError::internal(e.to_string()))),
                Err(e) => error_payload(&e),
            },
            Err(e) => serde_json::json!({
                "error": format!("Invalid arguments for {}: {}", RUN_BIGQUERY_TOOL, e)
            })
            .to_string(),
        },
        other => {
            tracing::warn!(tool_name = other, "Unknown tool requested");
            serde_json::json!({ "error": format!("Unknown tool: {}", other) }).to_string()
        }
    };

    tracing::debug!(
        tool_name = %call.name,
        duration_ms = start.elapsed().as_millis(),
        result_len = content.len(),
        "Tool execution complete"
    );

    ToolResult {
        tool_call_id: call.id.clone(),
        content,
    }
}

fn error_payload(error: &AgentError) -> String {
    match error {
        AgentError::Validation(e) => serde_json::json!({
            "error": error.to_string(),
            "kind": e.kind().to_string(),
        }),
        _ => serde_json::json!({ "error": error.to_string() }),
    }
    .to_string()
}
