//! Schema documentation for the analytical table.
//!
//! The agent is confined to one table with a fixed column set. This module
//! renders that description for the system prompt.

use serde::{Deserialize, Serialize};

use crate::config::TableTarget;

/// A column of the analytical table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// BigQuery Standard SQL type.
    pub data_type: String,
}

impl Column {
    /// Creates a new column with the given name and type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// Column layout of the table the agent may query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub columns: Vec<Column>,
}

impl Default for TableSchema {
    fn default() -> Self {
        Self::transactions()
    }
}

impl TableSchema {
    /// The sales transactions table.
    pub fn transactions() -> Self {
        Self {
            columns: vec![
                Column::new("order_id", "STRING"),
                Column::new("order_date", "DATE"),
                Column::new("region", "STRING"),
                Column::new("product", "STRING"),
                Column::new("amount", "FLOAT64"),
            ],
        }
    }

    /// Formats the schema for inclusion in an LLM system prompt.
    pub fn format_for_llm(&self, target: &TableTarget) -> String {
        let column_lines = self
            .columns
            .iter()
            .map(|c| format!("- {} {}\n", c.name, c.data_type))
            .collect::<Vec<_>>()
            .join("");

        format!(
            "Project: {}\nDataset: {}\nTable: {}\n\nColumns:\n{}",
            target.project, target.dataset, target.table, column_lines
        )
    }
}
