//! The question → SQL → answer orchestration.
//!
//! A linear call sequence: retrieve relevant table schemas, build the schema
//! context, prompt the LLM for SQL, parse the SQL out of the reply, execute
//! it, and synthesize a natural-language answer from the results. A failed
//! execution retries the whole sequence — regenerating the SQL — up to the
//! configured number of attempts.

use crate::context;
use crate::db::{QueryResults, QueryRunner};
use crate::retriever::SchemaRetriever;
use sqlx::PgPool;
use std::sync::Arc;
use tabletalk_core::{config::DEFAULT_TOP_K, AppError, AppResult};
use tabletalk_llm::{LlmClient, LlmRequest};
use tabletalk_prompt::{PromptRegistry, ANSWER_SYNTHESIS, TEXT_TO_SQL};

/// Options for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Number of table schemas to retrieve
    pub top_k: usize,

    /// Total attempts at generating and executing SQL (minimum 1)
    pub retries: u32,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            retries: 1,
        }
    }
}

/// SQL generated for a question, with the tables that informed it.
#[derive(Debug, Clone)]
pub struct GeneratedSql {
    pub sql: String,
    pub tables: Vec<String>,
}

/// Final pipeline output.
#[derive(Debug, Clone)]
pub struct PipelineAnswer {
    /// Natural-language answer synthesized from the query results
    pub answer: String,

    /// The SQL that produced the results
    pub sql: String,

    /// Tables retrieved for the question
    pub tables: Vec<String>,

    /// Number of result rows
    pub row_count: usize,
}

/// The text-to-SQL pipeline.
pub struct TextToSqlPipeline {
    runner: Arc<dyn QueryRunner>,
    retriever: SchemaRetriever,
    llm: Arc<dyn LlmClient>,
    registry: Arc<PromptRegistry>,
    model: String,
    dialect: String,
}

impl TextToSqlPipeline {
    pub fn new(
        pool: PgPool,
        retriever: SchemaRetriever,
        llm: Arc<dyn LlmClient>,
        registry: Arc<PromptRegistry>,
        model: impl Into<String>,
    ) -> Self {
        Self::with_runner(Arc::new(pool), retriever, llm, registry, model)
    }

    /// Construct against any query runner.
    pub fn with_runner(
        runner: Arc<dyn QueryRunner>,
        retriever: SchemaRetriever,
        llm: Arc<dyn LlmClient>,
        registry: Arc<PromptRegistry>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            retriever,
            llm,
            registry,
            model: model.into(),
            dialect: "postgresql".to_string(),
        }
    }

    /// Generate SQL for a question without executing it.
    pub async fn generate_sql(&self, question: &str, top_k: usize) -> AppResult<GeneratedSql> {
        let schemas = self.retriever.retrieve(question, top_k).await?;
        let tables: Vec<String> = schemas.iter().map(|s| s.table_name.clone()).collect();

        tracing::debug!("Retrieved tables for question: {:?}", tables);

        let schema_context = context::build_context(self.runner.as_ref(), &schemas).await?;
        tracing::debug!("Schema context:\n{}", schema_context);

        let prompt = self.registry.render(
            TEXT_TO_SQL,
            &serde_json::json!({
                "dialect": self.dialect,
                "schema": schema_context,
                "question": question,
            }),
        )?;

        let request = LlmRequest::new(prompt, &self.model).with_temperature(0.0);
        let response = self.llm.complete(&request).await?;

        let sql = parse_sql_reply(&response.content);
        if sql.is_empty() {
            return Err(AppError::Llm(
                "LLM reply contained no SQL query".to_string(),
            ));
        }

        tracing::debug!("Generated SQL: {}", sql);

        Ok(GeneratedSql { sql, tables })
    }

    /// Answer a question: generate SQL, execute it, and synthesize a reply.
    ///
    /// A database error during execution retries the whole sequence, letting
    /// the model produce a different query, up to `opts.retries` attempts.
    pub async fn answer(&self, question: &str, opts: &PipelineOptions) -> AppResult<PipelineAnswer> {
        let attempts = opts.retries.max(1);

        for attempt in 1..=attempts {
            let generated = self.generate_sql(question, opts.top_k).await?;

            match self.runner.run_query(&generated.sql).await {
                Ok(results) => {
                    tracing::debug!("Query returned {} rows", results.rows.len());

                    let answer = self.synthesize(question, &generated.sql, &results).await?;

                    return Ok(PipelineAnswer {
                        answer,
                        sql: generated.sql,
                        tables: generated.tables,
                        row_count: results.rows.len(),
                    });
                }
                Err(e) if attempt < attempts => {
                    tracing::warn!(
                        "Query execution failed (attempt {}/{}): {}",
                        attempt,
                        attempts,
                        e
                    );
                }
                Err(e) => return Err(e),
            }
        }

        // attempts >= 1, so the loop always returns before reaching here
        Err(AppError::Other("Pipeline produced no answer".to_string()))
    }

    /// Synthesize the final natural-language answer from query results.
    async fn synthesize(
        &self,
        question: &str,
        sql: &str,
        results: &QueryResults,
    ) -> AppResult<String> {
        let prompt = self.registry.render(
            ANSWER_SYNTHESIS,
            &serde_json::json!({
                "question": question,
                "sql_query": sql,
                "results": results.render(),
            }),
        )?;

        let request = LlmRequest::new(prompt, &self.model);
        let response = self.llm.complete(&request).await?;

        Ok(response.content.trim().to_string())
    }
}

/// Parse the SQL query out of an LLM reply.
///
/// Takes the content after `SQLQuery:` and before `SQLResult:` when those
/// markers are present, strips whitespace and code fences, and collapses
/// inner newlines to spaces.
pub fn parse_sql_reply(content: &str) -> String {
    const SQL_QUERY_PREFIX: &str = "SQLQuery:";
    const SQL_RESULT_PREFIX: &str = "SQLResult:";

    let mut remainder = content;

    if let Some(idx) = remainder.find(SQL_QUERY_PREFIX) {
        remainder = &remainder[idx + SQL_QUERY_PREFIX.len()..];
    }

    if let Some(idx) = remainder.find(SQL_RESULT_PREFIX) {
        remainder = &remainder[..idx];
    }

    let mut cleaned = remainder.trim().trim_matches('`').trim();

    // A ```sql fence leaves its language tag behind after the backticks go.
    if let Some(rest) = cleaned.strip_prefix("sql") {
        if rest.starts_with(char::is_whitespace) {
            cleaned = rest.trim_start();
        }
    }

    cleaned.replace('\n', " ").trim().to_string()
}
