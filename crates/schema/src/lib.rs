//! Table schema indexing, retrieval, and text-to-SQL orchestration.
//!
//! This crate implements the retrieval side of tabletalk:
//! - `db`: Postgres helpers (table listing, sample rows, query execution)
//! - `describe`: table summary generation with a one-file-per-table JSON cache
//! - `embeddings`: embedding providers for schema retrieval
//! - `retriever`: in-memory cosine-similarity index over table schemas
//! - `context`: schema context strings for the SQL prompt
//! - `pipeline`: the question → SQL → answer orchestration

pub mod context;
pub mod db;
pub mod describe;
pub mod embeddings;
pub mod pipeline;
pub mod retriever;
pub mod types;

// Re-export main types
pub use describe::{SummaryCache, TableDescriber};
pub use pipeline::{PipelineAnswer, PipelineOptions, TextToSqlPipeline};
pub use retriever::{SchemaIndex, SchemaRetriever};
pub use types::{TableInfo, TableSchema};
