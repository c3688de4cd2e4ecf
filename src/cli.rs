//! Command-line argument parsing for bq-agent.

use bq_agent::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// Ask questions about a BigQuery table in plain English.
#[derive(Parser, Debug)]
#[command(name = "bq-agent")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Question to answer. Omit to read questions from stdin, one per line.
    #[arg(value_name = "QUESTION")]
    pub question: Option<String>,

    /// Run a SELECT directly through the query tool and print rows as JSON
    #[arg(long, value_name = "SQL", conflicts_with = "question")]
    pub sql: Option<String>,

    /// GCP project (overrides config and BQ_PROJECT)
    #[arg(short = 'p', long, value_name = "PROJECT")]
    pub project: Option<String>,

    /// Dataset (overrides config and BQ_DATASET)
    #[arg(short = 'd', long, value_name = "DATASET")]
    pub dataset: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Use the mock warehouse and mock LLM (no network, for testing)
    #[arg(long)]
    pub mock: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Applies CLI overrides on top of file and environment settings.
    ///
    /// `--mock` is not an override: it replaces both backends outright.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(project) = &self.project {
            config.warehouse.project = Some(project.clone());
        }
        if let Some(dataset) = &self.dataset {
            config.warehouse.dataset = Some(dataset.clone());
        }
    }

    /// Returns true when questions should be read from stdin.
    pub fn is_interactive(&self) -> bool {
        self.question.is_none() && self.sql.is_none()
    }
}
