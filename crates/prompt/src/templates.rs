//! Built-in prompt templates.
//!
//! Templates use Handlebars syntax. The text-to-SQL template is adapted from
//! the langchain SQL prompt lineage: the model must answer in the
//! `Question:/SQLQuery:/SQLResult:/Answer:` line format so the SQL can be
//! parsed back out of the reply.

/// Template name for the table summary prompt.
pub const TABLE_SUMMARY: &str = "table_summary";

/// Template name for the question-to-SQL prompt.
pub const TEXT_TO_SQL: &str = "text_to_sql";

/// Template name for the answer synthesis prompt.
pub const ANSWER_SYNTHESIS: &str = "answer_synthesis";

/// Asks the model for a JSON summary of a table given sample rows.
///
/// Variables: `exclude_table_names`, `table_rows`.
pub const TABLE_SUMMARY_TEMPLATE: &str = "\
Give me a summary of the table as JSON with exactly these fields:

{\"table_name\": \"<concise unique name>\", \"table_summary\": \"<one paragraph summary>\"}

- The table name must be unique to the table and describe it while being concise.
- Do NOT output a generic table name (e.g. table, my_table).

Do NOT make the table name one of the following: {{exclude_table_names}}

Table:
{{table_rows}}

Summary: ";

/// Asks the model to produce a SQL query for a question given the schema
/// context of the retrieved tables.
///
/// Variables: `dialect`, `schema`, `question`.
pub const TEXT_TO_SQL_TEMPLATE: &str = "\
Given an input question, first create a syntactically correct {{dialect}} \
query to run, then look at the results of the query and return the answer. \
You can order the results by a relevant column to return the most \
interesting examples in the database.\n\n\
Never query for all the columns from a specific table, only ask for a \
few relevant columns given the question.\n\n\
Pay attention to use only the column names that you can see in the schema \
description. \
Always give alias to the tables and use them in the query, use with the right columns \
in order to avoid errors. \n\n\
Answer only what you were asked for, do not add any additional information. \
Be careful to not query for columns that do not exist. \
Pay attention to which column is in which table. \
Also, qualify column names with the table name when needed. \
You are required to use the following format, each taking one line:\n\n\
Question: Question here\n\
SQLQuery: SQL Query to run\n\
SQLResult: Result of the SQLQuery\n\
Answer: Final answer here\n\n\
Only use tables listed below.\n\
{{schema}}\n\n\
Question: {{question}}\n\
SQLQuery: ";

/// Asks the model to synthesize a final answer from the query results.
///
/// Variables: `question`, `sql_query`, `results`.
pub const ANSWER_SYNTHESIS_TEMPLATE: &str = "\
Given an input question, synthesize a response from the query results.\n\
If the user asks a question that is not related to getting information from \
the database, you should answer with a generic response.\n\
Question: {{question}}\n\
SQL: {{sql_query}}\n\
SQL Response: {{results}}\n\
Response: ";
