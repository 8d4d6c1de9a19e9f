//! Domain types for table schema retrieval.

use serde::{Deserialize, Serialize};

/// A generated table summary, persisted as one JSON file per table.
///
/// `table_name` is always the real database table name; the model only
/// supplies the summary text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    /// Database table name
    pub table_name: String,

    /// One-paragraph natural language summary of the table contents
    pub table_summary: String,
}

/// A table schema entry held in the retrieval index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Database table name
    pub table_name: String,

    /// Cached summary used as retrieval context, if one exists
    pub context: Option<String>,
}

impl TableSchema {
    /// The text embedded for similarity search.
    pub fn embedding_text(&self) -> String {
        match self.context {
            Some(ref context) => format!("{}: {}", self.table_name, context),
            None => self.table_name.clone(),
        }
    }
}
