//! Query execution for bq-agent.
//!
//! This module bridges validated SQL to the warehouse and reshapes results
//! for the caller.

pub mod executor;

pub use executor::QueryExecutor;
