//! Schema context strings for the SQL prompt.
//!
//! For each retrieved table, the live column info is fetched from the
//! database and combined with the cached summary into one description; the
//! descriptions of all retrieved tables are joined with blank lines.

use crate::db::QueryRunner;
use crate::types::TableSchema;
use tabletalk_core::AppResult;

/// Combine a table's column info with its summary.
pub fn full_context(table_info: &str, table_context: Option<&str>) -> String {
    match table_context {
        Some(context) if !context.is_empty() => {
            format!("{} The table description is: {}", table_info, context)
        }
        _ => table_info.to_string(),
    }
}

/// Build the combined context string for a set of retrieved tables.
pub async fn build_context(
    runner: &dyn QueryRunner,
    schemas: &[TableSchema],
) -> AppResult<String> {
    let mut descriptions = Vec::with_capacity(schemas.len());

    for schema in schemas {
        let info = runner.table_info(&schema.table_name).await?;
        descriptions.push(full_context(&info, schema.context.as_deref()));
    }

    Ok(descriptions.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::QueryResults;
    use tabletalk_core::AppResult;

    struct FixedInfoRunner;

    #[async_trait::async_trait]
    impl QueryRunner for FixedInfoRunner {
        async fn table_info(&self, table: &str) -> AppResult<String> {
            Ok(format!("Table '{}' has columns: id (integer).", table))
        }

        async fn run_query(&self, _sql: &str) -> AppResult<QueryResults> {
            unreachable!("context building never executes queries")
        }
    }

    #[tokio::test]
    async fn test_build_context_joins_tables_with_blank_lines() {
        let schemas = vec![
            crate::types::TableSchema {
                table_name: "orders".to_string(),
                context: Some("Customer purchase records".to_string()),
            },
            crate::types::TableSchema {
                table_name: "products".to_string(),
                context: None,
            },
        ];

        let context = build_context(&FixedInfoRunner, &schemas).await.unwrap();
        assert_eq!(
            context,
            "Table 'orders' has columns: id (integer). The table description is: Customer purchase records\n\n\
             Table 'products' has columns: id (integer)."
        );
    }

    #[test]
    fn test_full_context_with_description() {
        let combined = full_context(
            "Table 'orders' has columns: id (integer).",
            Some("Customer purchase records"),
        );
        assert_eq!(
            combined,
            "Table 'orders' has columns: id (integer). The table description is: Customer purchase records"
        );
    }

    #[test]
    fn test_full_context_without_description() {
        let info = "Table 'orders' has columns: id (integer).";
        assert_eq!(full_context(info, None), info);
        assert_eq!(full_context(info, Some("")), info);
    }
}
