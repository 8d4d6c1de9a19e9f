//! Tables command handler.
//!
//! Lists the database tables with their cached summaries, if any.

use clap::Args;
use tabletalk_core::{AppConfig, AppResult};
use tabletalk_schema::{db, SummaryCache};

/// List database tables and cached summaries
#[derive(Args, Debug)]
pub struct TablesCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl TablesCommand {
    /// Execute the tables command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing tables command");

        let pool = super::connect_pool(config).await?;
        let tables = db::list_tables(&pool).await?;
        let cache = SummaryCache::new(config.table_info_dir());

        let mut entries = Vec::with_capacity(tables.len());
        for table in tables {
            let summary = cache.lookup(&table)?.map(|info| info.table_summary);
            entries.push((table, summary));
        }

        if self.json {
            let output: Vec<_> = entries
                .iter()
                .map(|(table, summary)| {
                    serde_json::json!({
                        "table": table,
                        "summary": summary,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            for (table, summary) in &entries {
                match summary {
                    Some(summary) => println!("{}: {}", table, summary),
                    None => println!("{}: (no cached summary)", table),
                }
            }
        }

        Ok(())
    }
}
