//! Error types for bq-agent.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

use crate::safety::ValidationError;

/// Main error type for bq-agent operations.
#[derive(Error, Debug)]
pub enum AgentError {
    /// The SQL guard rejected a candidate query. Never reaches the warehouse.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The warehouse rejected or failed a validated query (syntax, permissions,
    /// byte quota, transient service failures).
    #[error("Execution error: {0}")]
    Execution(String),

    /// LLM API errors (rate limits, auth, timeouts, etc.)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Configuration errors (invalid config file, missing project, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AgentError {
    /// Creates an execution error with the given message.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Creates an LLM error with the given message.
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Validation Error",
            Self::Execution(_) => "Execution Error",
            Self::Llm(_) => "LLM Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns true if the query was stopped by the guard before execution.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if the warehouse failed a query that passed the guard.
    pub fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }
}

/// Result type alias using AgentError.
pub type Result<T> = std::result::Result<T, AgentError>;
