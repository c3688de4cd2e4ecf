//! bq-agent - Natural-language analyst for a single BigQuery table.
//!
//! This library exposes the core modules for use in integration tests.

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod query;
pub mod safety;
pub mod schema;
pub mod warehouse;
