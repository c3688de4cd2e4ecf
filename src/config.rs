//! Configuration management for bq-agent.
//!
//! Handles loading configuration from TOML files and environment variables.
//! The resolved [`TableTarget`] is an immutable value handed to the prompt
//! layer; the SQL gate and executor never read configuration.

use crate::error::{AgentError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Default BigQuery REST endpoint.
pub const DEFAULT_BIGQUERY_API_URL: &str = "https://bigquery.googleapis.com/bigquery/v2";

/// Main configuration structure for bq-agent.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Warehouse target and connection settings.
    #[serde(default)]
    pub warehouse: WarehouseConfig,

    /// LLM provider configuration.
    #[serde(default)]
    pub llm: LlmConfig,
}

/// Warehouse target and connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// GCP project that owns the dataset and is billed for queries.
    pub project: Option<String>,

    /// Dataset containing the analytical table.
    pub dataset: Option<String>,

    /// Table the agent is allowed to query.
    #[serde(default = "default_table")]
    pub table: String,

    /// Processing location (e.g. "US", "EU").
    pub location: Option<String>,

    /// Base URL of the BigQuery REST API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// HTTP timeout for each API call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_table() -> String {
    "transactions".to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_BIGQUERY_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            project: None,
            dataset: None,
            table: default_table(),
            location: None,
            api_base_url: default_api_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl WarehouseConfig {
    /// Applies environment variables (BQ_PROJECT, BQ_DATASET, BQ_LOCATION) as defaults.
    pub fn apply_env_defaults(&mut self) {
        if self.project.is_none() {
            self.project = std::env::var("BQ_PROJECT").ok();
        }
        if self.dataset.is_none() {
            self.dataset = std::env::var("BQ_DATASET").ok();
        }
        if self.location.is_none() {
            self.location = std::env::var("BQ_LOCATION").ok();
        }
    }

    /// Parses and validates the API base URL.
    pub fn api_url(&self) -> Result<Url> {
        let url = Url::parse(&self.api_base_url)
            .map_err(|e| AgentError::config(format!("Invalid api_base_url: {e}")))?;

        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(AgentError::config(format!(
                "Invalid scheme '{}' in api_base_url. Expected 'https' or 'http'",
                url.scheme()
            )));
        }

        Ok(url)
    }
}

/// LLM provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// LLM provider: "gemini" or "mock".
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model name (e.g., "gemini-2.5-flash").
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
        }
    }
}

/// The fully-resolved table the agent documents and queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableTarget {
    pub project: String,
    pub dataset: String,
    pub table: String,
}

impl TableTarget {
    pub fn new(
        project: impl Into<String>,
        dataset: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            dataset: dataset.into(),
            table: table.into(),
        }
    }

    /// Backtick-quoted `project.dataset.table` reference for Standard SQL.
    pub fn qualified_name(&self) -> String {
        format!("`{}.{}.{}`", self.project, self.dataset, self.table)
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bq-agent")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    ///
    /// A missing file yields the default configuration.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AgentError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            AgentError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Resolves the table target, failing if project or dataset is unset.
    pub fn resolved_target(&self) -> Result<TableTarget> {
        let project = self.warehouse.project.as_deref().ok_or_else(|| {
            AgentError::config("No project configured. Set BQ_PROJECT or warehouse.project")
        })?;
        let dataset = self.warehouse.dataset.as_deref().ok_or_else(|| {
            AgentError::config("No dataset configured. Set BQ_DATASET or warehouse.dataset")
        })?;

        Ok(TableTarget::new(project, dataset, &self.warehouse.table))
    }
}
