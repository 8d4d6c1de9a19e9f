//! Prompt system for tabletalk.
//!
//! This crate provides the built-in prompt templates of the text-to-SQL
//! pipeline and a Handlebars-based registry for rendering them:
//! - `table_summary`: JSON summary of a table from sample rows
//! - `text_to_sql`: dialect-aware question-to-SQL template
//! - `answer_synthesis`: natural-language answer from query results

pub mod registry;
pub mod templates;

// Re-export main types
pub use registry::PromptRegistry;
pub use templates::{ANSWER_SYNTHESIS, TABLE_SUMMARY, TEXT_TO_SQL};
