//! Command handlers for the tabletalk CLI.
//!
//! This module organizes all CLI commands into separate submodules and
//! provides the shared bootstrap helpers that wire the pipeline together.

pub mod ask;
pub mod chat;
pub mod describe;
pub mod tables;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use describe::DescribeCommand;
pub use tables::TablesCommand;

use sqlx::PgPool;
use std::sync::Arc;
use tabletalk_core::{AppConfig, AppResult};
use tabletalk_llm::{create_client, JsonProgram, LlmClient};
use tabletalk_prompt::PromptRegistry;
use tabletalk_schema::embeddings::{create_embedder, EmbeddingProvider};
use tabletalk_schema::{db, SchemaRetriever, TableDescriber, TextToSqlPipeline};

/// Connect to the configured Postgres database.
pub async fn connect_pool(config: &AppConfig) -> AppResult<PgPool> {
    let url = config.database.url()?;
    db::connect(&url).await
}

/// Create the configured LLM client.
pub fn build_llm(config: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
    let endpoint = config.provider_endpoint(&config.provider);
    let api_key = config.resolve_api_key(&config.provider);
    create_client(&config.provider, endpoint.as_deref(), api_key.as_deref())
}

/// Create the configured embedding provider.
pub fn build_embedder(config: &AppConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    let endpoint = config.provider_endpoint(&config.embedding_provider);
    create_embedder(
        &config.embedding_provider,
        endpoint.as_deref(),
        &config.embedding_model,
    )
}

/// Create the table describer used to populate the summary cache.
pub fn build_describer(
    config: &AppConfig,
    llm: Arc<dyn LlmClient>,
    registry: Arc<PromptRegistry>,
) -> AppResult<TableDescriber> {
    let program = JsonProgram::new(llm, config.model.clone());
    TableDescriber::new(config.table_info_dir(), program, registry)
}

/// Wire the full pipeline: describe tables (cache-or-generate), build the
/// schema index, and assemble the orchestrator.
pub async fn build_pipeline(config: &AppConfig, pool: PgPool) -> AppResult<TextToSqlPipeline> {
    let registry = Arc::new(PromptRegistry::new());
    let llm = build_llm(config)?;

    let mut describer = build_describer(config, Arc::clone(&llm), Arc::clone(&registry))?;
    let schemas = describer.describe_all(&pool).await?;

    let embedder = build_embedder(config)?;
    let retriever = SchemaRetriever::build(embedder, schemas).await?;

    Ok(TextToSqlPipeline::new(
        pool,
        retriever,
        llm,
        registry,
        config.model.clone(),
    ))
}
