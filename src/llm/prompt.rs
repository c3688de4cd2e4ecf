//! Prompt construction for LLM requests.
//!
//! Builds the analyst system prompt with the table documentation injected.

use crate::config::TableTarget;
use crate::llm::types::{Conversation, Message};
use crate::schema::TableSchema;

/// System prompt template for the BigQuery analyst.
const SYSTEM_PROMPT_TEMPLATE: &str = r#"You are a BigQuery data analyst assistant.

Users ask questions in English.

Steps:
1) Translate the question into BigQuery SQL.
2) Call the run_bigquery tool.
3) Explain the results in simple language.

Rules:
- Only query the schema below.
- Always use fully-qualified names: {table}
- Only write SELECT statements. Never modify data.
- If the tool reports an error, explain it to the user instead of guessing results.

Schema:
{schema}"#;

/// Builds the system prompt for `target`.
pub fn build_system_prompt(target: &TableTarget, schema: &TableSchema) -> String {
    SYSTEM_PROMPT_TEMPLATE
        .replace("{table}", &target.qualified_name())
        .replace("{schema}", &schema.format_for_llm(target))
}

/// Builds the complete message list for an LLM request.
///
/// Combines the system prompt with the conversation history.
pub fn build_messages(system_prompt: &str, conversation: &Conversation) -> Vec<Message> {
    let mut messages = Vec::with_capacity(conversation.len() + 1);
    messages.push(Message::system(system_prompt));
    messages.extend(conversation.messages().iter().cloned());
    messages
}
