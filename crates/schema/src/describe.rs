//! Table summary generation with a flat JSON file cache.
//!
//! Each table gets one JSON file under the persistence directory, written
//! once and read thereafter; there is no invalidation or refresh. When a
//! table has no cached summary, sample rows are sent through a typed
//! completion program and the result is persisted.

use crate::db::{self, SAMPLE_ROW_LIMIT};
use crate::types::{TableInfo, TableSchema};
use sqlx::PgPool;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabletalk_core::{AppError, AppResult};
use tabletalk_llm::JsonProgram;
use tabletalk_prompt::{PromptRegistry, TABLE_SUMMARY};

/// Flat JSON file cache of table summaries, one file per table.
pub struct SummaryCache {
    dir: PathBuf,
}

impl SummaryCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path to the cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Look up a cached summary for a table.
    ///
    /// Files are matched by table-name prefix. Zero matches means no entry;
    /// exactly one is deserialized and reused; more than one is an error.
    /// A missing cache directory counts as empty.
    pub fn lookup(&self, table: &str) -> AppResult<Option<TableInfo>> {
        let matches = self.matching_files(table)?;

        match matches.as_slice() {
            [] => Ok(None),
            [path] => {
                let contents = std::fs::read_to_string(path).map_err(|e| {
                    AppError::Schema(format!("Failed to read cache file {:?}: {}", path, e))
                })?;
                let info: TableInfo = serde_json::from_str(&contents).map_err(|e| {
                    AppError::Schema(format!("Invalid cache file {:?}: {}", path, e))
                })?;
                Ok(Some(info))
            }
            _ => Err(AppError::Schema(format!(
                "More than one cache file matching table '{}': {:?}",
                table, matches
            ))),
        }
    }

    /// Persist a summary as `<dir>/<table>.json`.
    pub fn store(&self, info: &TableInfo) -> AppResult<()> {
        let path = self.path_for(&info.table_name);
        let contents = serde_json::to_string(info)?;

        std::fs::write(&path, contents).map_err(|e| {
            AppError::Schema(format!("Failed to write cache file {:?}: {}", path, e))
        })?;

        Ok(())
    }

    /// Find cache files whose name starts with the table name.
    fn matching_files(&self, table: &str) -> AppResult<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut matches = Vec::new();

        for entry in std::fs::read_dir(&self.dir).map_err(|e| {
            AppError::Schema(format!(
                "Failed to read table info directory {:?}: {}",
                self.dir, e
            ))
        })? {
            let entry = entry.map_err(AppError::Io)?;
            let name = entry.file_name();
            if name.to_string_lossy().starts_with(table) {
                matches.push(entry.path());
            }
        }

        matches.sort();
        Ok(matches)
    }

    fn path_for(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{}.json", table))
    }
}

/// Describes database tables and manages the summary cache.
pub struct TableDescriber {
    cache: SummaryCache,
    program: JsonProgram<TableInfo>,
    registry: Arc<PromptRegistry>,
    described: HashSet<String>,
}

impl TableDescriber {
    /// Create a describer, ensuring the cache directory exists.
    pub fn new(
        persist_dir: impl Into<PathBuf>,
        program: JsonProgram<TableInfo>,
        registry: Arc<PromptRegistry>,
    ) -> AppResult<Self> {
        let persist_dir = persist_dir.into();

        std::fs::create_dir_all(&persist_dir).map_err(|e| {
            AppError::Schema(format!(
                "Failed to create table info directory {:?}: {}",
                persist_dir, e
            ))
        })?;

        Ok(Self {
            cache: SummaryCache::new(persist_dir),
            program,
            registry,
            described: HashSet::new(),
        })
    }

    /// Describe every table in the database, using cached summaries where
    /// they exist and generating the rest.
    ///
    /// A generation failure for one table is logged and the table skipped;
    /// the batch continues.
    pub async fn describe_all(&mut self, pool: &PgPool) -> AppResult<Vec<TableSchema>> {
        let tables = db::list_tables(pool).await?;
        tracing::info!("Describing {} tables", tables.len());

        let mut schemas = Vec::with_capacity(tables.len());

        for table in tables {
            let info = match self.cache.lookup(&table)? {
                Some(info) => {
                    tracing::debug!("Using cached summary for table '{}'", table);
                    self.described.insert(info.table_name.clone());
                    info
                }
                None => {
                    let rows = db::sample_rows(pool, &table, SAMPLE_ROW_LIMIT).await?;
                    match self.generate(&table, &rows).await {
                        Ok(info) => {
                            if self.described.insert(info.table_name.clone()) {
                                self.cache.store(&info)?;
                                tracing::info!("Described table '{}'", info.table_name);
                            } else {
                                tracing::debug!(
                                    "Table name '{}' already recorded, skipping save",
                                    info.table_name
                                );
                            }
                            info
                        }
                        Err(e) => {
                            tracing::warn!("Failed to describe table '{}': {}", table, e);
                            continue;
                        }
                    }
                }
            };

            schemas.push(TableSchema {
                table_name: info.table_name,
                context: Some(info.table_summary),
            });
        }

        Ok(schemas)
    }

    /// Generate a summary for a table from its sample rows.
    ///
    /// The table name in the result is pinned to the real database table
    /// name; the model only supplies the summary.
    async fn generate(&self, table: &str, rows: &[String]) -> AppResult<TableInfo> {
        let exclude = format!("{:?}", self.described.iter().collect::<Vec<_>>());

        let prompt = self.registry.render(
            TABLE_SUMMARY,
            &serde_json::json!({
                "exclude_table_names": exclude,
                "table_rows": rows.join("\n"),
            }),
        )?;

        let mut info = self.program.run(prompt).await?;
        info.table_name = table.to_string();

        Ok(info)
    }

    /// Path to the persistence directory.
    pub fn persist_dir(&self) -> &Path {
        self.cache.dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabletalk_core::AppResult;
    use tabletalk_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
    use tempfile::TempDir;

    /// LLM stub that replies with a fixed body.
    struct StubClient {
        reply: String,
    }

    #[async_trait::async_trait]
    impl LlmClient for StubClient {
        fn provider_name(&self) -> &str {
            "stub"
        }

        async fn complete(&self, _request: &LlmRequest) -> AppResult<LlmResponse> {
            Ok(LlmResponse {
                content: self.reply.clone(),
                model: "stub".to_string(),
                usage: LlmUsage::default(),
            })
        }
    }

    fn describer_with_reply(dir: &TempDir, reply: &str) -> TableDescriber {
        let client = Arc::new(StubClient {
            reply: reply.to_string(),
        });
        let program = JsonProgram::new(client, "stub");
        TableDescriber::new(dir.path(), program, Arc::new(PromptRegistry::new())).unwrap()
    }

    #[tokio::test]
    async fn test_generate_pins_table_name() {
        let dir = TempDir::new().unwrap();
        let describer = describer_with_reply(
            &dir,
            r#"{"table_name": "fancy_invented_name", "table_summary": "Customer orders"}"#,
        );

        let info = describer
            .generate("orders", &["(1, 'Widget', 9.99)".to_string()])
            .await
            .unwrap();

        assert_eq!(info.table_name, "orders");
        assert_eq!(info.table_summary, "Customer orders");
    }

    #[test]
    fn test_cache_roundtrip() {
        let dir = TempDir::new().unwrap();
        let cache = SummaryCache::new(dir.path());

        let info = TableInfo {
            table_name: "orders".to_string(),
            table_summary: "Customer orders".to_string(),
        };
        cache.store(&info).unwrap();

        let cached = cache.lookup("orders").unwrap();
        assert_eq!(cached, Some(info));
    }

    #[test]
    fn test_cache_miss() {
        let dir = TempDir::new().unwrap();
        let cache = SummaryCache::new(dir.path());
        assert_eq!(cache.lookup("orders").unwrap(), None);
    }

    #[test]
    fn test_lookup_matches_prefixed_file() {
        // The file need not be named exactly <table>.json; any name sharing
        // the table prefix is reused.
        let dir = TempDir::new().unwrap();
        let cache = SummaryCache::new(dir.path());

        std::fs::write(
            dir.path().join("orders.v2.json"),
            r#"{"table_name": "orders", "table_summary": "Customer orders"}"#,
        )
        .unwrap();

        let cached = cache.lookup("orders").unwrap().unwrap();
        assert_eq!(cached.table_summary, "Customer orders");
    }

    #[test]
    fn test_lookup_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let cache = SummaryCache::new(dir.path().join("never_created"));
        assert_eq!(cache.lookup("orders").unwrap(), None);
    }

    #[test]
    fn test_ambiguous_cache_is_an_error() {
        let dir = TempDir::new().unwrap();
        let cache = SummaryCache::new(dir.path());

        for name in ["orders.json", "orders_archive.json"] {
            std::fs::write(
                dir.path().join(name),
                r#"{"table_name": "x", "table_summary": "y"}"#,
            )
            .unwrap();
        }

        let err = cache.lookup("orders").unwrap_err();
        assert!(err.to_string().contains("More than one cache file"));
    }

    #[test]
    fn test_invalid_cache_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let cache = SummaryCache::new(dir.path());

        std::fs::write(dir.path().join("orders.json"), "not json").unwrap();

        let err = cache.lookup("orders").unwrap_err();
        assert!(err.to_string().contains("Invalid cache file"));
    }

    #[tokio::test]
    async fn test_exclusion_list_in_prompt() {
        // The exclusion list keeps the model from reusing names already
        // claimed by earlier tables; verify it reaches the rendered prompt.
        let dir = TempDir::new().unwrap();
        let mut describer = describer_with_reply(
            &dir,
            r#"{"table_name": "x", "table_summary": "y"}"#,
        );
        describer.described.insert("customers".to_string());

        let prompt = describer
            .registry
            .render(
                TABLE_SUMMARY,
                &serde_json::json!({
                    "exclude_table_names":
                        format!("{:?}", describer.described.iter().collect::<Vec<_>>()),
                    "table_rows": "(1)",
                }),
            )
            .unwrap();

        assert!(prompt.contains("customers"));
    }
}
