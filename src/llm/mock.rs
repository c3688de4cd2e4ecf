//! Mock LLM client for testing.
//!
//! Provides deterministic tool calls and summaries based on input patterns.

use async_trait::async_trait;

use crate::error::Result;
use crate::llm::tools::{RunBigQueryInput, ToolDefinition, RUN_BIGQUERY_TOOL};
use crate::llm::types::{LlmResponse, Message, Role, ToolCall, ToolRound};
use crate::llm::LlmClient;

/// Maximum rows quoted back in a mock summary.
const SUMMARY_ROW_LIMIT: usize = 5;

/// Mock LLM client that turns known questions into `run_bigquery` calls.
///
/// Used for unit testing and `--mock` runs without making real API calls.
#[derive(Debug, Clone, Default)]
pub struct MockLlmClient {
    /// Custom question pattern -> SQL mappings, checked before the defaults.
    custom_queries: Vec<(String, String)>,
}

impl MockLlmClient {
    /// Creates a new mock client with default patterns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a custom mapping.
    ///
    /// When the question contains `pattern`, the mock calls `run_bigquery` with `sql`.
    pub fn with_query(mut self, pattern: impl Into<String>, sql: impl Into<String>) -> Self {
        self.custom_queries.push((pattern.into(), sql.into()));
        self
    }

    /// Picks the SQL to run for a question, if any.
    fn sql_for(&self, input: &str) -> Option<String> {
        let input_lower = input.to_lowercase();

        for (pattern, sql) in &self.custom_queries {
            if input_lower.contains(&pattern.to_lowercase()) {
                return Some(sql.clone());
            }
        }

        if input_lower.contains("region") {
            return Some(
                "SELECT region, SUM(amount) AS total FROM transactions GROUP BY region ORDER BY total DESC"
                    .to_string(),
            );
        }

        if input_lower.contains("product") {
            return Some(
                "SELECT product, COUNT(*) AS orders FROM transactions GROUP BY product ORDER BY orders DESC"
                    .to_string(),
            );
        }

        if input_lower.contains("recent") || input_lower.contains("latest") {
            return Some(
                "SELECT * FROM transactions ORDER BY order_date DESC LIMIT 10".to_string(),
            );
        }

        if input_lower.contains("delete") || input_lower.contains("remove") {
            return Some("DELETE FROM transactions WHERE amount < 0".to_string());
        }

        None
    }

    /// Extracts the last user message content from a message list.
    fn extract_user_input(messages: &[Message]) -> String {
        messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }

    /// Summarizes a tool result payload in plain language, columns in the
    /// order the payload lists them.
    fn summarize(content: &str) -> String {
        let parsed: serde_json::Value = match serde_json::from_str(content) {
            Ok(value) => value,
            Err(_) => return "I couldn't read the query results.".to_string(),
        };

        if let Some(error) = parsed.get("error").and_then(|e| e.as_str()) {
            return format!("I couldn't run that query. {}", error);
        }

        let Some(rows) = parsed.as_array() else {
            return "I couldn't read the query results.".to_string();
        };

        if rows.is_empty() {
            return "The query returned no rows.".to_string();
        }

        let mut response = format!("The query returned {} row(s):\n", rows.len());
        for row in rows.iter().take(SUMMARY_ROW_LIMIT) {
            if let Some(fields) = row.as_object() {
                let line = fields
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v))
                    .collect::<Vec<_>>()
                    .join(", ");
                response.push_str(&format!("- {}\n", line));
            }
        }
        response
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse> {
        let input = Self::extract_user_input(messages);
        let can_query = tools.iter().any(|t| t.name == RUN_BIGQUERY_TOOL);

        match self.sql_for(&input) {
            Some(sql) if can_query => {
                let arguments = serde_json::to_string(&RunBigQueryInput { sql })
                    .unwrap_or_else(|_| "{}".to_string());
                Ok(LlmResponse::with_tool_calls(
                    String::new(),
                    vec![ToolCall {
                        id: "mock_tool_call_1".to_string(),
                        name: RUN_BIGQUERY_TOOL.to_string(),
                        arguments,
                    }],
                ))
            }
            _ => Ok(LlmResponse::text(
                "I can only answer questions about the transactions table. Could you rephrase?",
            )),
        }
    }

    async fn continue_with_tool_results(
        &self,
        _messages: &[Message],
        rounds: &[ToolRound],
        _tools: &[ToolDefinition],
    ) -> Result<LlmResponse> {
        let summary = rounds
            .last()
            .and_then(|round| round.results.first())
            .map(|result| Self::summarize(&result.content))
            .unwrap_or_else(|| "I couldn't retrieve any results.".to_string());
        Ok(LlmResponse::text(summary))
    }
}
