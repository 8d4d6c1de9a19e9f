//! Describe command handler.
//!
//! Pre-populates the table summary cache for every table in the database,
//! so later `ask` and `chat` startups only read cached files.

use clap::Args;
use std::sync::Arc;
use tabletalk_core::{AppConfig, AppResult};
use tabletalk_prompt::PromptRegistry;

/// Pre-populate the table summary cache
#[derive(Args, Debug)]
pub struct DescribeCommand {}

impl DescribeCommand {
    /// Execute the describe command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing describe command");

        let pool = super::connect_pool(config).await?;
        let llm = super::build_llm(config)?;
        let registry = Arc::new(PromptRegistry::new());

        let mut describer = super::build_describer(config, llm, registry)?;
        let schemas = describer.describe_all(&pool).await?;

        println!(
            "Described {} tables (cache: {})",
            schemas.len(),
            describer.persist_dir().display()
        );

        for schema in &schemas {
            println!("  {}", schema.table_name);
        }

        Ok(())
    }
}
