//! LLM integration for bq-agent.
//!
//! Provides the client trait the agent loop talks to, plus the Gemini and
//! mock implementations.

pub mod gemini;
pub mod mock;
pub mod prompt;
pub mod tools;
pub mod types;

pub use gemini::{GeminiClient, GeminiConfig};
pub use mock::MockLlmClient;
pub use prompt::{build_messages, build_system_prompt};
pub use tools::{
    execute_tool_call, get_tool_definitions, run_bigquery, RunBigQueryInput, ToolDefinition,
    RUN_BIGQUERY_TOOL,
};
pub use types::{Conversation, LlmResponse, Message, Role, ToolCall, ToolResult, ToolRound};

use async_trait::async_trait;
use std::str::FromStr;

use crate::config::LlmConfig;
use crate::error::{AgentError, Result};

/// Trait for LLM clients that support function calling.
///
/// Implementations must be thread-safe (Send + Sync) to support async operations.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends the conversation and lets the model either answer or call tools.
    async fn complete_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse>;

    /// Resends the conversation together with every tool round so far.
    async fn continue_with_tool_results(
        &self,
        messages: &[Message],
        rounds: &[ToolRound],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse>;
}

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    /// Google Gemini
    #[default]
    Gemini,
    /// Mock client for testing (no API key required)
    Mock,
}

impl LlmProvider {
    /// Returns the provider as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Mock => "mock",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown LLM provider: {}", s)),
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Creates an LLM client for the configured provider.
///
/// Gemini reads its key from `GEMINI_API_KEY`, falling back to `GOOGLE_API_KEY`.
pub fn create_client(config: &LlmConfig) -> Result<Box<dyn LlmClient>> {
    let provider: LlmProvider = config.provider.parse().map_err(AgentError::config)?;

    match provider {
        LlmProvider::Gemini => {
            let key = std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("GOOGLE_API_KEY"))
                .map_err(|_| {
                    AgentError::llm("No API key configured. Set GEMINI_API_KEY or GOOGLE_API_KEY.")
                })?;
            Ok(Box::new(GeminiClient::new(GeminiConfig::new(
                key,
                config.model.clone(),
            ))?))
        }
        LlmProvider::Mock => Ok(Box::new(MockLlmClient::new())),
    }
}
