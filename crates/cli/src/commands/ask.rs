//! Ask command handler.
//!
//! Runs the full pipeline for a single question and prints the answer.

use clap::Args;
use tabletalk_core::{AppConfig, AppResult};
use tabletalk_schema::PipelineOptions;

/// Ask a one-shot question against the database
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Number of table schemas to retrieve
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Total attempts at generating and executing SQL
    #[arg(long, default_value = "1")]
    pub retries: u32,

    /// Print the generated SQL without executing it
    #[arg(long)]
    pub sql_only: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let pool = super::connect_pool(config).await?;
        let pipeline = super::build_pipeline(config, pool).await?;

        let top_k = self.top_k.unwrap_or(config.top_k);

        if self.sql_only {
            let generated = pipeline.generate_sql(&self.question, top_k).await?;

            if self.json {
                let output = serde_json::json!({
                    "sql": generated.sql,
                    "tables": generated.tables,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", generated.sql);
            }

            return Ok(());
        }

        let opts = PipelineOptions {
            top_k,
            retries: self.retries,
        };

        let result = pipeline.answer(&self.question, &opts).await?;

        if self.json {
            let output = serde_json::json!({
                "answer": result.answer,
                "sql": result.sql,
                "tables": result.tables,
                "rowCount": result.row_count,
                "model": config.model,
                "provider": config.provider,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", result.answer);
        }

        Ok(())
    }
}
