//! The analyst agent loop.
//!
//! Sends the question to the model, runs any `run_bigquery` calls it makes,
//! feeds the results back, and returns the model's final answer.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::TableTarget;
use crate::error::{AgentError, Result};
use crate::llm::{
    build_messages, build_system_prompt, execute_tool_call, get_tool_definitions, Conversation,
    LlmClient, Message, ToolRound,
};
use crate::query::QueryExecutor;
use crate::schema::TableSchema;
use crate::warehouse::{RowMap, WarehouseClient};

/// Tool-call rounds allowed per question before giving up.
pub const MAX_TOOL_ROUNDS: usize = 5;

/// A natural-language analyst over one warehouse table.
pub struct Agent {
    llm: Box<dyn LlmClient>,
    warehouse: Box<dyn WarehouseClient>,
    system_prompt: String,
    conversation: Conversation,
}

impl Agent {
    /// Creates an agent documenting `target` in its system prompt.
    pub fn new(
        llm: Box<dyn LlmClient>,
        warehouse: Box<dyn WarehouseClient>,
        target: &TableTarget,
    ) -> Self {
        Self {
            llm,
            warehouse,
            system_prompt: build_system_prompt(target, &TableSchema::transactions()),
            conversation: Conversation::new(),
        }
    }

    /// Answers a question, querying the warehouse as the model requests.
    pub async fn ask(&mut self, question: &str) -> Result<String> {
        let start = Instant::now();
        debug!(input_len = question.len(), "Starting question");

        // History only records completed exchanges; a failed question leaves it untouched.
        let mut messages = build_messages(&self.system_prompt, &self.conversation);
        messages.push(Message::user(question));
        let tools = get_tool_definitions();

        let mut response = self.llm.complete_with_tools(&messages, &tools).await?;
        let mut rounds: Vec<ToolRound> = Vec::new();
        let executor = QueryExecutor::new(self.warehouse.as_ref());

        while response.has_tool_calls() {
            if rounds.len() >= MAX_TOOL_ROUNDS {
                warn!(rounds = rounds.len(), "Model kept calling tools");
                return Err(AgentError::llm(format!(
                    "Model did not answer after {} tool rounds",
                    MAX_TOOL_ROUNDS
                )));
            }

            debug!(tool_count = response.tool_calls.len(), "Processing tool calls");
            let mut results = Vec::with_capacity(response.tool_calls.len());
            for call in &response.tool_calls {
                results.push(execute_tool_call(&executor, call).await);
            }
            rounds.push(ToolRound {
                calls: response.tool_calls,
                results,
            });

            response = self
                .llm
                .continue_with_tool_results(&messages, &rounds, &tools)
                .await?;
        }

        self.conversation.add_user(question);
        self.conversation.add_assistant(response.content.as_str());
        info!(
            total_duration_ms = start.elapsed().as_millis(),
            tool_rounds = rounds.len(),
            answer_len = response.content.len(),
            "Question answered"
        );

        Ok(response.content)
    }

    /// Runs SQL directly through the `run_bigquery` tool, bypassing the model.
    pub async fn run_sql(&self, sql: &str) -> Result<Vec<RowMap>> {
        let executor = QueryExecutor::new(self.warehouse.as_ref());
        crate::llm::run_bigquery(&executor, sql).await
    }

    /// Conversation history so far.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Forgets previous questions and answers.
    pub fn reset(&mut self) {
        self.conversation.clear();
    }
}
