//! Postgres access helpers.
//!
//! A small set of parametrized helpers over a `PgPool`: list the public
//! tables, sample rows for summarization, read column metadata, and execute
//! generated SQL. Generated queries arrive as free text from the LLM, so
//! their results are rendered dynamically, column by column.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Column, Row};
use tabletalk_core::{AppError, AppResult};
use uuid::Uuid;

/// Number of sample rows fed to the table summary prompt.
pub const SAMPLE_ROW_LIMIT: u32 = 5;

fn db_err(e: sqlx::Error) -> AppError {
    AppError::Database(e.to_string())
}

/// Connect to Postgres with a small connection pool.
pub async fn connect(url: &str) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(url)
        .await
        .map_err(db_err)?;

    tracing::debug!("Connected to Postgres");
    Ok(pool)
}

/// Validate a table identifier before it is interpolated into SQL.
///
/// Only plain lowercase-friendly identifiers are accepted: ASCII
/// alphanumerics and underscores, not starting with a digit.
pub fn validate_identifier(name: &str) -> AppResult<()> {
    let mut chars = name.chars();

    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(AppError::Database(format!(
            "Invalid table identifier: {:?}",
            name
        )))
    }
}

/// List all base tables in the public schema.
pub async fn list_tables(pool: &PgPool) -> AppResult<Vec<String>> {
    let rows = sqlx::query(
        "SELECT table_name::text \
         FROM information_schema.tables \
         WHERE table_schema = 'public' AND table_type = 'BASE TABLE' \
         ORDER BY table_name",
    )
    .fetch_all(pool)
    .await
    .map_err(db_err)?;

    rows.iter()
        .map(|row| row.try_get::<String, _>(0).map_err(db_err))
        .collect()
}

/// Fetch up to `limit` rows from a table, rendered as display strings.
pub async fn sample_rows(pool: &PgPool, table: &str, limit: u32) -> AppResult<Vec<String>> {
    validate_identifier(table)?;

    let query = format!("SELECT * FROM \"{}\" LIMIT {}", table, limit);
    let rows = sqlx::query(&query).fetch_all(pool).await.map_err(db_err)?;

    Ok(rows.iter().map(render_row).collect())
}

/// Read column names and data types for a table.
pub async fn table_columns(pool: &PgPool, table: &str) -> AppResult<Vec<(String, String)>> {
    let rows = sqlx::query(
        "SELECT column_name::text, data_type::text \
         FROM information_schema.columns \
         WHERE table_schema = 'public' AND table_name = $1 \
         ORDER BY ordinal_position",
    )
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(db_err)?;

    rows.iter()
        .map(|row| {
            let name = row.try_get::<String, _>(0).map_err(db_err)?;
            let data_type = row.try_get::<String, _>(1).map_err(db_err)?;
            Ok((name, data_type))
        })
        .collect()
}

/// Build the schema description line for a table: its name and column types.
pub async fn table_info(pool: &PgPool, table: &str) -> AppResult<String> {
    let columns = table_columns(pool, table).await?;

    if columns.is_empty() {
        return Err(AppError::Database(format!(
            "Table '{}' does not exist or has no columns",
            table
        )));
    }

    Ok(format_table_info(table, &columns))
}

/// Format a table info line from column metadata.
pub fn format_table_info(table: &str, columns: &[(String, String)]) -> String {
    let column_list = columns
        .iter()
        .map(|(name, data_type)| format!("{} ({})", name, data_type))
        .collect::<Vec<_>>()
        .join(", ");

    format!("Table '{}' has columns: {}.", table, column_list)
}

/// Results of an executed query, rendered for prompt inclusion and display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResults {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl QueryResults {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as a plain text table: a header line, then one line per row.
    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return "(no rows)".to_string();
        }

        let mut out = self.columns.join(" | ");
        for row in &self.rows {
            out.push('\n');
            out.push_str(&row.join(" | "));
        }
        out
    }
}

/// The database surface the pipeline needs: table descriptions for the
/// prompt context and execution of generated SQL.
#[async_trait::async_trait]
pub trait QueryRunner: Send + Sync {
    async fn table_info(&self, table: &str) -> AppResult<String>;
    async fn run_query(&self, sql: &str) -> AppResult<QueryResults>;
}

#[async_trait::async_trait]
impl QueryRunner for PgPool {
    async fn table_info(&self, table: &str) -> AppResult<String> {
        table_info(self, table).await
    }

    async fn run_query(&self, sql: &str) -> AppResult<QueryResults> {
        run_query(self, sql).await
    }
}

/// Execute a generated SQL query and collect all rows.
///
/// Errors from the database surface directly; the caller decides whether to
/// retry generation.
pub async fn run_query(pool: &PgPool, sql: &str) -> AppResult<QueryResults> {
    tracing::debug!("Executing query: {}", sql);

    let rows = sqlx::query(sql).fetch_all(pool).await.map_err(db_err)?;

    let columns = rows
        .first()
        .map(|row| {
            row.columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect()
        })
        .unwrap_or_default();

    let rendered = rows
        .iter()
        .map(|row| {
            (0..row.columns().len())
                .map(|idx| render_value(row, idx))
                .collect()
        })
        .collect();

    Ok(QueryResults {
        columns,
        rows: rendered,
    })
}

/// Render a full row as a parenthesized tuple string.
fn render_row(row: &PgRow) -> String {
    let values = (0..row.columns().len())
        .map(|idx| render_value(row, idx))
        .collect::<Vec<_>>()
        .join(", ");

    format!("({})", values)
}

/// Render a single column value as a display string.
///
/// Generated queries can select any column type, so decoding is attempted
/// across the common Postgres types; anything else renders as "?".
fn render_value(row: &PgRow, idx: usize) -> String {
    macro_rules! try_render {
        ($ty:ty) => {
            if let Ok(value) = row.try_get::<Option<$ty>, _>(idx) {
                return match value {
                    Some(v) => v.to_string(),
                    None => "NULL".to_string(),
                };
            }
        };
    }

    try_render!(String);
    try_render!(i64);
    try_render!(i32);
    try_render!(i16);
    try_render!(f64);
    try_render!(f32);
    // NUMERIC/DECIMAL only decode to Decimal, never to the float types
    try_render!(Decimal);
    try_render!(bool);
    try_render!(Uuid);
    try_render!(DateTime<Utc>);
    try_render!(NaiveDateTime);
    try_render!(NaiveDate);

    "?".to_string()
}
